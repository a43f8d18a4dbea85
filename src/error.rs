//! Error types.

/// Everything that can go wrong when setting up a scene.
///
/// Rendering itself never fails: back-facing and degenerate triangles are culled, and the rest
/// is a precondition of the inputs validated here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A face refers to a position that does not exist.
    #[error("face {face}: position index {index} out of range ({len} positions)")]
    PositionIndex { face: usize, index: usize, len: usize },
    /// A face refers to a vertex normal that does not exist.
    #[error("face {face}: normal index {index} out of range ({len} normals)")]
    NormalIndex { face: usize, index: usize, len: usize },
    /// A face refers to a texture coordinate that does not exist.
    #[error("face {face}: texture coordinate index {index} out of range ({len} coordinates)")]
    TexCoordIndex { face: usize, index: usize, len: usize },
    /// Pixel or depth buffer length does not match the viewport.
    #[error("{kind} buffer holds {actual} elements, a {width}x{height} viewport needs {expected}")]
    BufferSize {
        kind: &'static str,
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    EmptyViewport { width: usize, height: usize },
    #[error("a {size}x{size} texture needs {expected} texels, got {actual}")]
    TextureSize {
        size: usize,
        expected: usize,
        actual: usize,
    },
    /// A face record of an OBJ file that cannot be turned into triangles.
    #[error("obj line {line}: {reason}")]
    Obj { line: usize, reason: &'static str },
    /// Textures are square, sampled with a single size.
    #[error("texture image must be square, got {width}x{height}")]
    NonSquareTexture { width: usize, height: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
