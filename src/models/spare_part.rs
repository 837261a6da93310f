use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SparePart {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub stock: i64,
    pub unit_cost: f64,
}

impl SparePart {
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock <= threshold
    }
}

/// A part consumed by a ticket, priced at the time of use.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPart {
    pub ticket_id: i64,
    pub part_id: i64,
    pub part_name: String,
    pub quantity: i64,
    pub unit_cost: f64,
}

impl TicketPart {
    pub fn total_cost(&self) -> f64 {
        self.quantity as f64 * self.unit_cost
    }
}
