//! Wire-format constants and built-in schema identities

use crate::schema::Schema;

/// Key carrying the type tag of every serialized object
pub const SCHEMA_KEY: &str = "OTIO_SCHEMA";

/// Media reference key a clip resolves to unless told otherwise
pub const DEFAULT_MEDIA_KEY: &str = "DEFAULT_MEDIA";

/// Tolerance in seconds used when intersecting child ranges
pub const RANGE_EPSILON: f64 = opentime::DEFAULT_EPSILON;

/// Track kind for picture
pub const TRACK_KIND_VIDEO: &str = "Video";

/// Track kind for sound
pub const TRACK_KIND_AUDIO: &str = "Audio";

/// Name given to the stack a timeline owns
pub const TIMELINE_TRACKS_NAME: &str = "tracks";

/// Legacy name for `Track`
pub const SEQUENCE_ALIAS: &str = "Sequence";

/// Built-in schema identities
pub mod schemas {
    use super::Schema;

    /// Clip with a keyed set of media references
    pub const CLIP: Schema = Schema::new_static("Clip", 2);
    /// Empty space
    pub const GAP: Schema = Schema::new_static("Gap", 1);
    /// Blend between neighbouring items
    pub const TRANSITION: Schema = Schema::new_static("Transition", 1);
    /// Sequential composition
    pub const TRACK: Schema = Schema::new_static("Track", 1);
    /// Layered composition
    pub const STACK: Schema = Schema::new_static("Stack", 1);
    /// Generic composition
    pub const COMPOSITION: Schema = Schema::new_static("Composition", 1);
    /// Root aggregate
    pub const TIMELINE: Schema = Schema::new_static("Timeline", 1);
    /// Bag of arbitrary objects
    pub const SERIALIZABLE_COLLECTION: Schema = Schema::new_static("SerializableCollection", 1);
    /// Media at a URL
    pub const EXTERNAL_REFERENCE: Schema = Schema::new_static("ExternalReference", 1);
    /// Placeholder for absent media
    pub const MISSING_REFERENCE: Schema = Schema::new_static("MissingReference", 1);
    /// Procedurally generated media
    pub const GENERATOR_REFERENCE: Schema = Schema::new_static("GeneratorReference", 1);
    /// Numbered image files
    pub const IMAGE_SEQUENCE_REFERENCE: Schema = Schema::new_static("ImageSequenceReference", 1);
    /// Annotation over a range
    pub const MARKER: Schema = Schema::new_static("Marker", 2);
    /// Generic effect
    pub const EFFECT: Schema = Schema::new_static("Effect", 1);
    /// Effect that alters time
    pub const TIME_EFFECT: Schema = Schema::new_static("TimeEffect", 1);
    /// Constant speed change
    pub const LINEAR_TIME_WARP: Schema = Schema::new_static("LinearTimeWarp", 1);
    /// Hold a single frame
    pub const FREEZE_FRAME: Schema = Schema::new_static("FreezeFrame", 1);
}
