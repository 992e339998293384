//! vidquery - answers Russian analytics questions about a video catalogue
//!
//! A question such as "Сколько видео набрало больше 100 000 просмотров?" is
//! normalized, scanned for signals (dates, thresholds, metric, creator) and
//! matched against an ordered rule table. The first matching rule emits a
//! parameterized SQL plan over the `videos` and `video_snapshots` tables.
//!
//! - [`translator`]: the pure question-to-plan core
//! - [`responder`]: turns a plan into a chat reply through a [`responder::PlanExecutor`]
//! - [`dataset`]: JSON dump to ordered upsert batches
//! - [`observability`]: structured logging, scopes and counters
//! - [`http_server`] and [`cli`]: front-ends

pub mod cli;
pub mod dataset;
pub mod http_server;
pub mod observability;
pub mod responder;
pub mod translator;
