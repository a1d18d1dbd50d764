//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitives. Large ranges are split with a
//! binned surface area heuristic, small ranges at the centroid median.

use log::{debug, warn};
use rand::{Rng, RngCore};
use tessel_math::{axis_component, Aabb, Interval, Ray, Vec3};

use crate::error::GeometryError;
use crate::hittable::{HitRecord, Hittable};

/// Maximum primitives per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 2;

/// Ranges larger than this are split with the SAH; smaller ones at the median.
pub const SAH_THRESHOLD: usize = 8;

const SAH_BINS: usize = 24;
const TRAVERSAL_COST: f64 = 1.0;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
        /// Axis the children were partitioned along
        axis: usize,
    },
    /// Leaf node with at most [`LEAF_MAX_SIZE`] primitives.
    Leaf {
        objects: Vec<Box<dyn Hittable>>,
        bbox: Aabb,
    },
    /// Empty scene.
    Empty,
}

/// A primitive with its box cached for the duration of the build.
struct BuildItem {
    object: Box<dyn Hittable>,
    bbox: Aabb,
    centroid: Vec3,
}

impl BuildItem {
    fn new(object: Box<dyn Hittable>, bbox: Aabb) -> Self {
        Self {
            object,
            bbox,
            centroid: bbox.centroid(),
        }
    }

    #[inline]
    fn key(&self, axis: usize) -> f64 {
        axis_component(self.centroid, axis)
    }
}

impl BvhNode {
    /// Build a BVH over `objects`.
    ///
    /// Every primitive must have a bounding box. `rng` only breaks ties
    /// between equally long split axes, so a fixed seed gives a fixed tree.
    pub fn new(
        objects: Vec<Box<dyn Hittable>>,
        rng: &mut dyn RngCore,
    ) -> Result<Self, GeometryError> {
        let mut items = Vec::with_capacity(objects.len());
        for (index, object) in objects.into_iter().enumerate() {
            let bbox = object
                .bounding_box()
                .ok_or(GeometryError::MissingBoundingBox { index })?;
            items.push(BuildItem::new(object, bbox));
        }
        Ok(Self::from_items(items, rng))
    }

    /// Like [`BvhNode::new`], but primitives without a bounding box are
    /// dropped from the tree instead of failing the build.
    pub fn new_lenient(objects: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        let items = objects
            .into_iter()
            .enumerate()
            .filter_map(|(index, object)| match object.bounding_box() {
                Some(bbox) => Some(BuildItem::new(object, bbox)),
                None => {
                    warn!("Excluding unbounded primitive {} from BVH", index);
                    None
                }
            })
            .collect();
        Self::from_items(items, rng)
    }

    fn from_items(items: Vec<BuildItem>, rng: &mut dyn RngCore) -> Self {
        if items.is_empty() {
            return BvhNode::Empty;
        }
        let root = Self::build(items, rng);
        debug!(
            "BVH built: {} primitives, {} leaves, depth {}",
            root.primitive_count(),
            root.leaf_count(),
            root.depth()
        );
        root
    }

    /// Recursive BVH construction.
    fn build(mut items: Vec<BuildItem>, rng: &mut dyn RngCore) -> Self {
        let n = items.len();

        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: items.into_iter().map(|item| item.object).collect(),
                bbox: bounds,
            };
        }

        // Centroid spread decides the split axis
        let (lo, hi) = items.iter().fold(
            (Vec3::INFINITY, Vec3::NEG_INFINITY),
            |(lo, hi), item| (lo.min(item.centroid), hi.max(item.centroid)),
        );
        let extent = hi - lo;
        let axis = choose_axis(extent, rng);

        let mid = if n > SAH_THRESHOLD {
            sah_split(
                &mut items,
                axis,
                axis_component(lo, axis),
                axis_component(extent, axis),
                bounds.surface_area(),
            )
            .unwrap_or_else(|| median_split(&mut items, axis))
        } else {
            median_split(&mut items, axis)
        };

        let right_items = items.split_off(mid);
        let left = Self::build(items, rng);
        let right = Self::build(right_items, rng);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
            axis,
        }
    }

    /// Number of node levels; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn primitive_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { objects, .. } => objects.len(),
            BvhNode::Branch { left, right, .. } => {
                left.primitive_count() + right.primitive_count()
            }
        }
    }

    /// Split axes of all branches in pre-order.
    pub fn split_axes(&self) -> Vec<usize> {
        let mut axes = Vec::new();
        self.collect_axes(&mut axes);
        axes
    }

    fn collect_axes(&self, axes: &mut Vec<usize>) {
        if let BvhNode::Branch {
            left, right, axis, ..
        } = self
        {
            axes.push(*axis);
            left.collect_axes(axes);
            right.collect_axes(axes);
        }
    }
}

/// Axis of greatest extent; ties are broken at random.
fn choose_axis(extent: Vec3, rng: &mut dyn RngCore) -> usize {
    let longest = extent.max_element();
    let tied: Vec<usize> = (0..3)
        .filter(|&axis| axis_component(extent, axis) == longest)
        .collect();
    match tied.len() {
        0 | 1 => tied.first().copied().unwrap_or(0),
        n => tied[rng.gen_range(0..n)],
    }
}

/// Sort by centroid along `axis` and split at the middle index.
fn median_split(items: &mut [BuildItem], axis: usize) -> usize {
    items.sort_by(|a, b| {
        a.key(axis)
            .partial_cmp(&b.key(axis))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items.len() / 2
}

#[derive(Clone, Copy)]
struct Bin {
    bounds: Aabb,
    count: usize,
}

/// Binned SAH split along `axis`.
///
/// Returns the partition point after reordering `items`, or `None` when no
/// bin boundary separates the centroids.
fn sah_split(
    items: &mut Vec<BuildItem>,
    axis: usize,
    base: f64,
    extent: f64,
    parent_area: f64,
) -> Option<usize> {
    if extent <= 0.0 || parent_area <= 0.0 {
        return None;
    }

    let scale = SAH_BINS as f64 / extent;
    let bin_of = |item: &BuildItem| -> usize {
        (((item.key(axis) - base) * scale) as usize).min(SAH_BINS - 1)
    };

    let mut bins = [Bin {
        bounds: Aabb::EMPTY,
        count: 0,
    }; SAH_BINS];
    for item in items.iter() {
        let bin = &mut bins[bin_of(item)];
        bin.bounds = Aabb::surrounding(&bin.bounds, &item.bbox);
        bin.count += 1;
    }

    // Prefix sweep: everything in bins 0..=i goes left
    let mut left_area = [0.0; SAH_BINS - 1];
    let mut left_count = [0usize; SAH_BINS - 1];
    let mut running = (Aabb::EMPTY, 0);
    for i in 0..SAH_BINS - 1 {
        running.0 = Aabb::surrounding(&running.0, &bins[i].bounds);
        running.1 += bins[i].count;
        left_area[i] = running.0.surface_area();
        left_count[i] = running.1;
    }

    let mut best: Option<(usize, f64)> = None;
    running = (Aabb::EMPTY, 0);
    for i in (0..SAH_BINS - 1).rev() {
        running.0 = Aabb::surrounding(&running.0, &bins[i + 1].bounds);
        running.1 += bins[i + 1].count;

        if left_count[i] == 0 || running.1 == 0 {
            continue;
        }

        let cost = TRAVERSAL_COST
            + (left_count[i] as f64 * left_area[i] + running.1 as f64 * running.0.surface_area())
                / parent_area;
        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((i, cost));
        }
    }

    let (split_bin, _) = best?;
    let (left, right): (Vec<_>, Vec<_>) = items
        .drain(..)
        .partition(|item| bin_of(item) <= split_bin);
    let mid = left.len();
    items.extend(left);
    items.extend(right);

    (mid > 0 && mid < items.len()).then_some(mid)
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest: Option<HitRecord<'a>> = None;
                for obj in objects {
                    let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
                    if let Some(rec) = obj.hit(ray, interval, rng) {
                        closest = Some(rec);
                    }
                }
                closest
            }

            BvhNode::Branch {
                left, right, bbox, ..
            } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_t = hit_left.map_or(ray_t, |rec| ray_t.with_max(rec.t));
                right.hit(ray, right_t, rng).or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => Some(*bbox),
        }
    }
}
