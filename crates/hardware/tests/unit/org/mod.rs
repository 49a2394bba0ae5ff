/// Bank array and timing broadcast.
pub mod channel;
