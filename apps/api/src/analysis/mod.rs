// Orchestrators over the extraction layer, plus the HTTP handlers that expose them.
//
// ARCHITECTURAL RULE: every NER call goes through `EntityExtractor`. The
// orchestrators here never touch a model backend directly, and they never
// return errors: a missing model or an unparseable field degrades to `None`.

pub mod handlers;
pub mod job;
pub mod matching;
pub mod resume;
