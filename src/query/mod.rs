//! Query builder state machine
//!
//! This module contains the fluent [`Builder`] and everything it produces:
//! - `builder`: type selection, guarded methods, shape options, assembly
//! - `delegate`: predicate and update calls forwarded to the accumulator
//! - `config`: the accumulated [`QueryConfiguration`] and its sub-specs
//! - `projection` / `sort`: projection and sort shapes
//! - `command`: the immutable [`Command`] handed to an execution layer
//!
//! # Examples
//!
//! ```
//! use docquery::query::{Builder, CommandKind};
//!
//! let mut qb = Builder::new("geo", "cafes");
//! qb.geo_near((-73.99, 40.73))
//!     .distance_multiplier(6378.1)?
//!     .spherical(true)?
//!     .limit(5);
//!
//! let command = qb.assemble();
//! assert!(matches!(command.kind(), CommandKind::GeoNear(_)));
//! # Ok::<(), docquery::error::DocQueryError>(())
//! ```

mod builder;
mod command;
mod config;
mod delegate;
mod projection;
mod sort;

#[cfg(test)]
mod tests;

pub use builder::Builder;
pub use command::{Command, CommandKind, CommandOptions, Namespace};
pub use config::{
    GeoNearSpec, GroupSpec, MapReduceSpec, OperationType, QueryConfiguration, ReduceContext,
};
pub use projection::{FieldProjection, Projection, Slice};
pub use sort::{SortOrder, SortSpec};
