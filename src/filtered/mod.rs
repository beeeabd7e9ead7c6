//! Selective disclosure of ledger records
//!
//! A [`LedgerRecord`] groups its content into component groups, builds one
//! nonce-salted tree per group and a top-level tree over the group roots whose
//! root is the record identifier. A [`FilteredRecord`] keeps only the proofs
//! its holder chose to disclose and still verifies against that identifier.

pub mod builder;
pub mod data;
pub mod ledger;
pub mod model;
pub mod record;

pub use builder::FilteredRecordBuilder;
pub use data::FilteredData;
pub use ledger::LedgerRecord;
pub use model::{
    Command, ComponentGroup, OutputState, PrivacySalt, RecordComponents, RecordMetadata,
    SignatoryKey, StateRef, TimeWindow, NOTARY_NAME_INDEX, TIME_WINDOW_INDEX,
};
pub use record::{DisclosureMode, FilteredComponentGroup, FilteredRecord};
