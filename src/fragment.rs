//! Fragment types, the bounded fragment collector and the depth-ordered
//! fragment manager.
//!
//! A fragment is a primitive queued for rasterization, tagged with its
//! object, its primitive index and a depth key. The manager owns the keys
//! for exactly one frame: collected after the screen pass, sorted
//! back-to-front, consumed by the rasterize pass.

use crate::color::Rgb8;
use crate::vertex::{Coordinate, Vertex16};

/// Key of one queued fragment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentKey {
    pub object_index: u16,
    pub primitive_index: u16,
    pub z: i16,
}

/// Triangle fragment with one pre-shaded color for the whole face.
#[derive(Copy, Clone, Debug, Default)]
pub struct MeshTriangleFragment {
    pub vertex_a: Vertex16,
    pub vertex_b: Vertex16,
    pub vertex_c: Vertex16,

    pub uv_a: Coordinate,
    pub uv_b: Coordinate,
    pub uv_c: Coordinate,

    pub index: u16,
    pub z: i16,

    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl MeshTriangleFragment {
    pub fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Triangle fragment carrying one pre-shaded color per corner, for
/// barycentric interpolation at raster time.
#[derive(Copy, Clone, Debug, Default)]
pub struct MeshVertexFragment {
    pub vertex_a: Vertex16,
    pub vertex_b: Vertex16,
    pub vertex_c: Vertex16,

    pub uv_a: Coordinate,
    pub uv_b: Coordinate,
    pub uv_c: Coordinate,

    pub index: u16,
    pub z: i16,

    pub red_a: u8,
    pub green_a: u8,
    pub blue_a: u8,

    pub red_b: u8,
    pub green_b: u8,
    pub blue_b: u8,

    pub red_c: u8,
    pub green_c: u8,
    pub blue_c: u8,
}

/// Edge fragment with one color for the whole line.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeLineFragment {
    pub vertex_a: Vertex16,
    pub vertex_b: Vertex16,

    pub index: u16,
    pub z: i16,

    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl EdgeLineFragment {
    pub fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Edge fragment with one color per endpoint.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeVertexFragment {
    pub vertex_a: Vertex16,
    pub vertex_b: Vertex16,

    pub index: u16,
    pub z: i16,

    pub red_a: u8,
    pub green_a: u8,
    pub blue_a: u8,

    pub red_b: u8,
    pub green_b: u8,
    pub blue_b: u8,
}

/// One shaded point of a point cloud.
#[derive(Copy, Clone, Debug, Default)]
pub struct PointCloudFragment {
    pub index: u16,

    pub x: i16,
    pub y: i16,
    pub z: i16,

    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl PointCloudFragment {
    pub fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Axis-aligned billboard rectangle.
#[derive(Copy, Clone, Debug, Default)]
pub struct BillboardFragment {
    pub top_left_x: i16,
    pub top_left_y: i16,
    pub bottom_right_x: i16,
    pub bottom_right_y: i16,

    pub z: i16,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl BillboardFragment {
    pub fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Plain color fragment, used by background fills.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorFragment {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub z: i16,
}

impl ColorFragment {
    pub fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Densely packed per-primitive RGB cache, three bytes per entry.
///
/// Objects keep one of these to carry lit colors from the world pass to the
/// fragment pass without storing full 32-bit colors.
#[derive(Clone, Debug)]
pub struct CompactRgb8List<const COUNT: usize> {
    colors: [[u8; 3]; COUNT],
}

impl<const COUNT: usize> CompactRgb8List<COUNT> {
    pub fn set_color(&mut self, color: Rgb8, index: u16) {
        self.colors[index as usize] = [color.red(), color.green(), color.blue()];
    }

    pub fn color(&self, index: u16) -> Rgb8 {
        let [red, green, blue] = self.colors[index as usize];
        Rgb8::new(red, green, blue)
    }
}

impl<const COUNT: usize> Default for CompactRgb8List<COUNT> {
    fn default() -> Self {
        Self {
            colors: [[0; 3]; COUNT],
        }
    }
}

/// Borrowed, bounded view render objects push their fragments into.
///
/// Capacity overflow drops the fragment (and counts it); the frame simply
/// renders without the overflowing primitives.
pub struct FragmentCollector<'a> {
    fragments: &'a mut [FragmentKey],
    count: &'a mut u16,
    dropped: &'a mut u16,
    object_index: u16,
}

impl FragmentCollector<'_> {
    /// Queue one fragment of the current object. Returns false when the pool
    /// is exhausted.
    pub fn add_fragment(&mut self, primitive_index: u16, z: i16) -> bool {
        if (*self.count as usize) < self.fragments.len() {
            self.fragments[*self.count as usize] = FragmentKey {
                object_index: self.object_index,
                primitive_index,
                z,
            };
            *self.count += 1;
            true
        } else {
            *self.dropped = self.dropped.saturating_add(1);
            false
        }
    }
}

/// Fixed-capacity collector plus back-to-front ordering.
#[derive(Clone, Debug)]
pub struct FragmentManager<const MAX_FRAGMENTS: usize> {
    fragments: [FragmentKey; MAX_FRAGMENTS],
    count: u16,
    dropped: u16,
    object_index: u16,
}

impl<const MAX_FRAGMENTS: usize> FragmentManager<MAX_FRAGMENTS> {
    pub fn new() -> Self {
        Self {
            fragments: [FragmentKey::default(); MAX_FRAGMENTS],
            count: 0,
            dropped: 0,
            object_index: 0,
        }
    }

    /// Drop all fragments; the start of a new frame.
    pub fn clear(&mut self) {
        self.count = 0;
        self.dropped = 0;
        self.object_index = 0;
    }

    /// Tag subsequently collected fragments with this object index.
    pub fn prepare_for_object(&mut self, object_index: u16) {
        self.object_index = object_index;
    }

    /// A collector view for the current object.
    pub fn collector(&mut self) -> FragmentCollector<'_> {
        FragmentCollector {
            fragments: &mut self.fragments,
            count: &mut self.count,
            dropped: &mut self.dropped,
            object_index: self.object_index,
        }
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// Fragments that did not fit this frame.
    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    pub fn get(&self, index: u16) -> FragmentKey {
        self.fragments[index as usize]
    }

    /// Sort collected fragments by descending z: farthest first, for
    /// back-to-front painting.
    ///
    /// With `std` this is the stable standard sort, so equal-z fragments
    /// keep their collection order. The no_std fallback is a Shell sort with
    /// unspecified tie-break order.
    pub fn sort(&mut self) {
        let live = &mut self.fragments[..self.count as usize];

        #[cfg(feature = "std")]
        live.sort_by(|a, b| b.z.cmp(&a.z));

        #[cfg(not(feature = "std"))]
        {
            let count = live.len();
            let mut gap = count >> 1;
            while gap > 0 {
                for i in gap..count {
                    let key = live[i];
                    let mut j = i;
                    while j >= gap && live[j - gap].z < key.z {
                        live[j] = live[j - gap];
                        j -= gap;
                    }
                    live[j] = key;
                }
                gap >>= 1;
            }
        }
    }
}

impl<const MAX_FRAGMENTS: usize> Default for FragmentManager<MAX_FRAGMENTS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_and_sorts_descending() {
        let mut manager: FragmentManager<8> = FragmentManager::new();
        manager.prepare_for_object(0);
        let mut collector = manager.collector();
        for (primitive, z) in [(0u16, 100i16), (1, 900), (2, -50), (3, 500)] {
            assert!(collector.add_fragment(primitive, z));
        }
        manager.sort();

        let keys: Vec<_> = (0..manager.count()).map(|i| manager.get(i)).collect();
        for pair in keys.windows(2) {
            assert!(pair[0].z >= pair[1].z);
        }
        assert_eq!(keys[0].primitive_index, 1);
        assert_eq!(keys[3].primitive_index, 2);
    }

    #[test]
    fn capacity_is_bounded_and_counted() {
        let mut manager: FragmentManager<4> = FragmentManager::new();
        manager.prepare_for_object(7);
        let mut collector = manager.collector();
        for i in 0..4 {
            assert!(collector.add_fragment(i, i as i16));
        }
        assert!(!collector.add_fragment(4, 4));
        assert!(!collector.add_fragment(5, 5));

        assert_eq!(manager.count(), 4);
        assert_eq!(manager.dropped(), 2);
        assert_eq!(manager.get(0).object_index, 7);
    }

    #[test]
    fn sort_is_stable_for_equal_z() {
        let mut manager: FragmentManager<8> = FragmentManager::new();
        manager.prepare_for_object(0);
        let mut collector = manager.collector();
        for primitive in 0..5u16 {
            assert!(collector.add_fragment(primitive, 300));
        }
        manager.sort();
        for i in 0..5u16 {
            assert_eq!(manager.get(i).primitive_index, i);
        }
    }

    #[test]
    fn object_index_tags_follow_prepare() {
        let mut manager: FragmentManager<8> = FragmentManager::new();
        manager.prepare_for_object(1);
        assert!(manager.collector().add_fragment(0, 10));
        manager.prepare_for_object(2);
        assert!(manager.collector().add_fragment(0, 20));

        assert_eq!(manager.get(0).object_index, 1);
        assert_eq!(manager.get(1).object_index, 2);
    }

    #[test]
    fn clear_resets_counts() {
        let mut manager: FragmentManager<2> = FragmentManager::new();
        let mut collector = manager.collector();
        assert!(collector.add_fragment(0, 1));
        assert!(collector.add_fragment(1, 2));
        assert!(!collector.add_fragment(2, 3));
        manager.clear();
        assert_eq!(manager.count(), 0);
        assert_eq!(manager.dropped(), 0);
    }

    #[test]
    fn compact_rgb_round_trip() {
        let mut list: CompactRgb8List<4> = CompactRgb8List::default();
        list.set_color(Rgb8::new(1, 2, 3), 2);
        assert_eq!(list.color(2), Rgb8::new(1, 2, 3));
        assert_eq!(list.color(0), Rgb8::new(0, 0, 0));
    }
}
