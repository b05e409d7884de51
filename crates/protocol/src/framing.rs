/// Maximum byte length of a length-delimited frame.
///
/// The default `tokio_util::codec::LengthDelimitedCodec` limit is too small
/// for classifier results that carry full model metadata alongside the
/// label, which would surface as a decode error on the console side.
///
/// The limit must match on both ends of the connection.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;
