//! Entity views: local list state reconciled with API replies.
//!
//! [`EntityView`] is generic over the record type and holds the pure
//! prepare/apply transitions. [`ActiveView`] wraps whichever view is mounted
//! so the app can hold one without being generic itself, and [`Pending`] is a
//! prepared request ready to be spawned.

mod active;
mod pager;
mod request;
mod state;

pub use active::{ActiveView, Command, Delivery, Pending};
pub use pager::Pager;
pub use request::execute;
pub use state::{
    form_fields, Applied, Completion, EntityView, Outcome, Phase, RelatedPanel, Request, Row,
    Ticket, SEARCH_FIELD,
};
