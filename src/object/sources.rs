//! Source providers: where objects read their vertices, primitives and
//! surface attributes from.
//!
//! The static variants borrow immutable tables (typically `'static` asset
//! data); the dynamic variants own mutable state the application can change
//! between frames. The optional attribute sources carry an associated
//! `HAS_*` constant so objects can skip whole passes at compile time when a
//! source kind provides nothing.

use crate::color::Rgb8;
use crate::shader::Material;
use crate::vertex::{Coordinate, EdgeLine, TriangleFace, TriangleUv, Vertex16};

/// Supplies object-space vertex positions.
pub trait VertexSource {
    fn vertex(&self, index: u16) -> Vertex16;
}

/// Vertices read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticVertexSource<'a> {
    vertices: &'a [Vertex16],
}

impl<'a> StaticVertexSource<'a> {
    pub fn new(vertices: &'a [Vertex16]) -> Self {
        Self { vertices }
    }

    pub(crate) fn set_table(&mut self, vertices: &'a [Vertex16]) {
        self.vertices = vertices;
    }
}

impl VertexSource for StaticVertexSource<'_> {
    #[inline]
    fn vertex(&self, index: u16) -> Vertex16 {
        self.vertices[index as usize]
    }
}

/// Vertices owned by the object; mutate between frames for procedural
/// geometry.
#[derive(Clone, Debug)]
pub struct OwnedVertexSource<const COUNT: usize> {
    pub vertices: [Vertex16; COUNT],
}

impl<const COUNT: usize> OwnedVertexSource<COUNT> {
    pub fn new(vertices: [Vertex16; COUNT]) -> Self {
        Self { vertices }
    }
}

impl<const COUNT: usize> VertexSource for OwnedVertexSource<COUNT> {
    #[inline]
    fn vertex(&self, index: u16) -> Vertex16 {
        self.vertices[index as usize]
    }
}

/// Supplies triangle faces.
pub trait TriangleSource {
    fn triangle(&self, index: u16) -> TriangleFace;
}

/// Triangles read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticTriangleSource<'a> {
    triangles: &'a [TriangleFace],
}

impl<'a> StaticTriangleSource<'a> {
    pub fn new(triangles: &'a [TriangleFace]) -> Self {
        Self { triangles }
    }

    pub(crate) fn set_table(&mut self, triangles: &'a [TriangleFace]) {
        self.triangles = triangles;
    }
}

impl TriangleSource for StaticTriangleSource<'_> {
    #[inline]
    fn triangle(&self, index: u16) -> TriangleFace {
        self.triangles[index as usize]
    }
}

/// Supplies edge lines.
pub trait EdgeSource {
    fn edge(&self, index: u16) -> EdgeLine;
}

/// Edges read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticEdgeSource<'a> {
    edges: &'a [EdgeLine],
}

impl<'a> StaticEdgeSource<'a> {
    pub fn new(edges: &'a [EdgeLine]) -> Self {
        Self { edges }
    }
}

impl EdgeSource for StaticEdgeSource<'_> {
    #[inline]
    fn edge(&self, index: u16) -> EdgeLine {
        self.edges[index as usize]
    }
}

/// Supplies per-primitive albedo colors.
pub trait AlbedoSource {
    const HAS_ALBEDOS: bool = true;

    fn albedo(&self, index: u16) -> Rgb8;
}

/// No albedo data; primitives default to white.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoAlbedoSource;

impl AlbedoSource for NoAlbedoSource {
    const HAS_ALBEDOS: bool = false;

    #[inline]
    fn albedo(&self, _index: u16) -> Rgb8 {
        Rgb8::WHITE
    }
}

/// One shared albedo for every primitive.
#[derive(Copy, Clone, Debug)]
pub struct SingleAlbedoSource {
    pub albedo: Rgb8,
}

impl Default for SingleAlbedoSource {
    fn default() -> Self {
        Self {
            albedo: Rgb8::WHITE,
        }
    }
}

impl AlbedoSource for SingleAlbedoSource {
    #[inline]
    fn albedo(&self, _index: u16) -> Rgb8 {
        self.albedo
    }
}

/// Per-primitive albedos read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticAlbedoSource<'a> {
    albedos: &'a [Rgb8],
}

impl<'a> StaticAlbedoSource<'a> {
    pub fn new(albedos: &'a [Rgb8]) -> Self {
        Self { albedos }
    }
}

impl AlbedoSource for StaticAlbedoSource<'_> {
    #[inline]
    fn albedo(&self, index: u16) -> Rgb8 {
        self.albedos[index as usize]
    }
}

/// Palette albedos: a small color table indexed per primitive.
#[derive(Copy, Clone, Debug)]
pub struct PalettedAlbedoSource<'a> {
    palette: &'a [Rgb8],
    indexes: &'a [u8],
}

impl<'a> PalettedAlbedoSource<'a> {
    pub fn new(palette: &'a [Rgb8], indexes: &'a [u8]) -> Self {
        Self { palette, indexes }
    }
}

impl AlbedoSource for PalettedAlbedoSource<'_> {
    #[inline]
    fn albedo(&self, index: u16) -> Rgb8 {
        self.palette[self.indexes[index as usize] as usize]
    }
}

/// Supplies per-primitive materials.
pub trait MaterialSource {
    const HAS_MATERIALS: bool = true;

    fn material(&self, index: u16) -> Material;
}

/// No material data; primitives default to plain diffuse.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiffuseMaterialSource;

impl MaterialSource for DiffuseMaterialSource {
    const HAS_MATERIALS: bool = false;

    #[inline]
    fn material(&self, _index: u16) -> Material {
        Material::DIFFUSE
    }
}

/// One shared material for every primitive.
#[derive(Copy, Clone, Debug, Default)]
pub struct SingleMaterialSource {
    pub material: Material,
}

impl MaterialSource for SingleMaterialSource {
    #[inline]
    fn material(&self, _index: u16) -> Material {
        self.material
    }
}

/// Per-primitive materials read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticMaterialSource<'a> {
    materials: &'a [Material],
}

impl<'a> StaticMaterialSource<'a> {
    pub fn new(materials: &'a [Material]) -> Self {
        Self { materials }
    }
}

impl MaterialSource for StaticMaterialSource<'_> {
    #[inline]
    fn material(&self, index: u16) -> Material {
        self.materials[index as usize]
    }
}

/// Supplies precomputed per-primitive normals (object space).
pub trait NormalSource {
    const HAS_NORMALS: bool = true;

    fn normal(&self, index: u16) -> Vertex16;
}

/// No normal data; objects derive normals from geometry.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoNormalSource;

impl NormalSource for NoNormalSource {
    const HAS_NORMALS: bool = false;

    #[inline]
    fn normal(&self, _index: u16) -> Vertex16 {
        Vertex16::ZERO
    }
}

/// Normals read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticNormalSource<'a> {
    normals: &'a [Vertex16],
}

impl<'a> StaticNormalSource<'a> {
    pub fn new(normals: &'a [Vertex16]) -> Self {
        Self { normals }
    }

    pub(crate) fn set_table(&mut self, normals: &'a [Vertex16]) {
        self.normals = normals;
    }
}

impl NormalSource for StaticNormalSource<'_> {
    #[inline]
    fn normal(&self, index: u16) -> Vertex16 {
        self.normals[index as usize]
    }
}

/// Supplies per-triangle texture coordinates.
pub trait UvSource {
    const HAS_UVS: bool = true;

    fn uvs(&self, index: u16) -> TriangleUv;
}

/// No UV data.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoUvSource;

impl UvSource for NoUvSource {
    const HAS_UVS: bool = false;

    #[inline]
    fn uvs(&self, _index: u16) -> TriangleUv {
        TriangleUv::default()
    }
}

/// UVs read from a borrowed table.
#[derive(Copy, Clone, Debug)]
pub struct StaticUvSource<'a> {
    uvs: &'a [TriangleUv],
}

impl<'a> StaticUvSource<'a> {
    pub fn new(uvs: &'a [TriangleUv]) -> Self {
        Self { uvs }
    }
}

impl UvSource for StaticUvSource<'_> {
    #[inline]
    fn uvs(&self, index: u16) -> TriangleUv {
        self.uvs[index as usize]
    }
}

/// Supplies texels to texture-sampling pixel shaders.
pub trait TextureSource {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn texel(&self, x: i16, y: i16) -> Rgb8;
}

/// A borrowed texel table, addressed with clamping.
#[derive(Copy, Clone, Debug)]
pub struct StaticTextureSource<'a> {
    texels: &'a [Rgb8],
    width: u16,
    height: u16,
}

impl<'a> StaticTextureSource<'a> {
    /// `texels` must hold `width * height` entries, row-major.
    pub fn new(texels: &'a [Rgb8], width: u16, height: u16) -> Self {
        debug_assert_eq!(texels.len(), width as usize * height as usize);
        Self {
            texels,
            width,
            height,
        }
    }
}

impl TextureSource for StaticTextureSource<'_> {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn texel(&self, x: i16, y: i16) -> Rgb8 {
        let x = (x.max(0) as u16).min(self.width - 1) as usize;
        let y = (y.max(0) as u16).min(self.height - 1) as usize;
        self.texels[y * self.width as usize + x]
    }
}

/// Convenience constructor for UV tables built from coordinate pairs.
pub const fn uv(ax: i16, ay: i16, bx: i16, by: i16, cx: i16, cy: i16) -> TriangleUv {
    TriangleUv {
        a: Coordinate { x: ax, y: ay },
        b: Coordinate { x: bx, y: by },
        c: Coordinate { x: cx, y: cy },
    }
}
