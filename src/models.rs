use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column headers of the ledger sheet, in order.
pub const LEDGER_COLUMNS: [&str; 5] = [
    "Conductor",
    "Fecha",
    "Monto",
    "Descripcion",
    "LinkComprobante",
];

/// One row of the ledger.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ExpenseRecord {
    #[schema(example = "Juan Pérez")]
    pub driver: String,
    /// `DD/MM/YYYY`
    #[schema(example = "05/06/2024")]
    pub date: String,
    #[schema(example = 15000)]
    pub amount: u64,
    #[schema(example = "Combustible")]
    pub description: String,
    #[schema(example = "./data/Comprobantes_pdf/Juan Pérez_05-06-2024.pdf")]
    pub receipt_link: String,
}
