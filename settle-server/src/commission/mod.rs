//! Commission split resolution

pub mod resolver;

pub use resolver::{
    CommissionError, CommissionSplit, ResolvedPercentages, resolve_direct_percentages,
    resolve_hotel_qr_percentages, split_direct, split_hotel_qr,
};
