//! K2 trainer core.
//!
//! Drives a Kettler ergometer over the K2 message bus from a workout video:
//! the workout is turned into a [`timeline::Timeline`], an
//! [`dispatcher::EffortDispatcher`] samples playback and publishes one
//! command per interval entered, and inbound status messages are rendered
//! by [`telemetry`]. Route views ([`route`], [`elevation`], [`map`]) work
//! from recorded GPS tracks, and [`ride`] sets resistance from the grade
//! at the distance ridden.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod elevation;
pub mod error;
pub mod kettler;
pub mod komoot_api;
pub mod map;
pub mod metrics;
pub mod models;
pub mod playback;
pub mod ride;
pub mod route;
pub mod session;
pub mod telemetry;
pub mod timeline;
pub mod topics;
pub mod transport;

pub use config::{load_config, save_config, K2Config};
pub use dispatcher::{DispatchState, EffortDispatcher};
pub use error::{K2Error, Result};
pub use models::{Effort, PowerRange, Segment, WorkoutDefinition};
pub use ride::RouteRide;
pub use route::{cumulative_distance, haversine, read_gpx, Track, TrackPoint};
pub use session::TrainerSession;
pub use telemetry::{format_status, KettlerData, TelemetryView};
pub use timeline::{build_timeline, resolve, EffortInterval, Timeline};
pub use transport::{EffortSink, K2Client, LogTransport, RecordingTransport, Transport};
