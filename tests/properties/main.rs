//! Property tests over the public `testflow` API.

mod checklist_props;
mod derating_props;
