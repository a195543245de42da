//! The tally domain itself, kept free of IO.
//! The basic idea is:
//!  - [tally::TallyStore] owns the date-to-count mapping.
//!  - [aggregate] derives weekly/monthly/lifetime views from it.
//!  - [settings::Settings] configures the optional unit conversion.
//!  - [backup] round-trips both through a portable JSON document.

pub mod aggregate;
pub mod backup;
pub mod settings;
pub mod tally;
