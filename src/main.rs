//! maintdesk main entrypoint.

use maintdesk::run;
use maintdesk::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
