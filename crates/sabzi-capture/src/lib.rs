mod camera;
mod frame;
mod snapshot;

pub use camera::{Camera, Facing, StreamConstraints, VideoStream};
pub use frame::{encode_jpeg, fit_within, prepare_frame, prepare_frame_blocking};
pub use snapshot::SnapshotCamera;
