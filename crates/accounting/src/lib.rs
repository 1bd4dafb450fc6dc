//! Accounting rules that run on the client.
//!
//! Pure domain logic only: no IO, no HTTP. The server stays the source of
//! truth; these checks only keep obviously invalid requests off the wire.

pub mod balance;
pub mod chart;
pub mod invoice;
pub mod ledger;

pub use balance::{BalanceError, Totals, can_submit, check, compute_totals, difference, is_balanced, validate};
pub use chart::{Account, AccountKind, AccountNode, AccountTree, ChartError, SaveAccount};
pub use invoice::{CreateInvoice, InvoiceLine, InvoiceTotals, InvoiceType, compute_invoice_totals};
pub use ledger::{
    CreateLedgerEntry, CreateLedgerLine, LedgerEntry, LedgerError, LedgerLine, MIN_LINES,
    PostedEntry, PostedLine,
};
