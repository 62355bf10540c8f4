use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::core::{Circle, Geometry, NodeId, NodeTree, Point};
use crate::layout::SortPolicy;

const INTERSECT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePackConfig {
    #[serde(default)]
    pub order: SortPolicy,
    /// Gap kept around every packed circle, in pre-normalization units.
    #[serde(default)]
    pub padding: f64,
}

impl Default for CirclePackConfig {
    fn default() -> Self {
        Self {
            order: SortPolicy::Insertion,
            padding: 0.0,
        }
    }
}

/// Result of packing one flat sibling set.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedCircles {
    /// Circles in input order, centered around the enclosing circle's center.
    pub circles: Vec<Circle>,
    pub enclosing: Circle,
}

/// Packs circles with the given radii, keeping input order.
#[must_use]
pub fn pack_circles(radii: &[f64]) -> PackedCircles {
    let mut circles: Vec<Circle> = radii
        .iter()
        .map(|r| Circle::new(0.0, 0.0, if r.is_finite() { r.max(0.0) } else { 0.0 }))
        .collect();
    let enclosing = pack_siblings(&mut circles);
    PackedCircles { circles, enclosing }
}

/// Assigns centers to `circles` (radii are read, never changed) so that no
/// two circles overlap.
///
/// Circles are placed one by one on a front chain; each new circle goes
/// tangent to the chain pair closest to the running centroid. Positions are
/// finally shifted so the enclosing circle is centered on the origin, and that
/// enclosing circle is returned. Zero-radius circles are parked on the
/// packing centroid.
pub fn pack_siblings(circles: &mut [Circle]) -> Circle {
    let positive: Vec<usize> = (0..circles.len()).filter(|i| circles[*i].r > 0.0).collect();
    if positive.is_empty() {
        for circle in circles.iter_mut() {
            circle.cx = 0.0;
            circle.cy = 0.0;
        }
        return Circle::default();
    }

    // Pack at unit scale so the intersection tolerance is relative to the radii.
    let max_r = positive.iter().map(|i| circles[*i].r).fold(0.0, f64::max);
    let mut packed: Vec<Circle> = positive
        .iter()
        .map(|i| Circle::new(0.0, 0.0, circles[*i].r / max_r))
        .collect();
    let unit = pack_front_chain(&mut packed);
    for (slot, circle) in positive.iter().zip(packed.iter_mut()) {
        circle.cx *= max_r;
        circle.cy *= max_r;
        circle.r = circles[*slot].r;
    }
    let enclosing = Circle::new(unit.cx * max_r, unit.cy * max_r, unit.r * max_r);

    let centroid = weighted_centroid(&packed);
    for circle in circles.iter_mut() {
        circle.cx = centroid.x;
        circle.cy = centroid.y;
    }
    for (slot, circle) in positive.iter().zip(packed) {
        circles[*slot] = circle;
    }
    enclosing
}

fn pack_front_chain(circles: &mut [Circle]) -> Circle {
    let n = circles.len();
    circles[0].cx = 0.0;
    circles[0].cy = 0.0;
    if n == 1 {
        return Circle::new(0.0, 0.0, circles[0].r);
    }

    circles[0].cx = -circles[1].r;
    circles[1].cx = circles[0].r;
    circles[1].cy = 0.0;
    if n == 2 {
        return recenter(circles);
    }

    circles[2] = place(circles[1], circles[0], circles[2]);

    let mut next = vec![0_usize; n];
    let mut prev = vec![0_usize; n];
    let (mut a, mut b) = (0_usize, 1_usize);
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let mut weight = 0.0;
    let mut sum = Point::default();
    for circle in &circles[..3] {
        accumulate(&mut sum, &mut weight, *circle);
    }

    let mut i = 3;
    'pack: while i < n {
        circles[i] = place(circles[a], circles[b], circles[i]);
        let candidate = circles[i];

        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(circles[j], candidate) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(circles[k], candidate) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[i] = a;
        next[i] = b;
        next[a] = i;
        prev[b] = i;
        accumulate(&mut sum, &mut weight, candidate);
        let centroid = Point::new(sum.x / weight, sum.y / weight);

        let mut best_score = score(circles, a, next[a], centroid);
        let mut cursor = next[i];
        while cursor != i {
            let cursor_score = score(circles, cursor, next[cursor], centroid);
            if cursor_score < best_score {
                a = cursor;
                best_score = cursor_score;
            }
            cursor = next[cursor];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cursor = next[b];
    while cursor != b {
        chain.push(circles[cursor]);
        cursor = next[cursor];
    }
    trace!(count = n, chain_len = chain.len(), "front chain packed");

    let enclosing = enclosing_circle(&chain);
    for circle in circles.iter_mut() {
        circle.cx -= enclosing.cx;
        circle.cy -= enclosing.cy;
    }
    Circle::new(0.0, 0.0, enclosing.r)
}

fn recenter(circles: &mut [Circle]) -> Circle {
    let enclosing = enclosing_circle(circles);
    for circle in circles.iter_mut() {
        circle.cx -= enclosing.cx;
        circle.cy -= enclosing.cy;
    }
    Circle::new(0.0, 0.0, enclosing.r)
}

fn accumulate(sum: &mut Point, weight: &mut f64, circle: Circle) {
    let w = circle.r * circle.r;
    sum.x += circle.cx * w;
    sum.y += circle.cy * w;
    *weight += w;
}

fn weighted_centroid(circles: &[Circle]) -> Point {
    let mut sum = Point::default();
    let mut weight = 0.0;
    for circle in circles {
        accumulate(&mut sum, &mut weight, *circle);
    }
    if weight > 0.0 {
        Point::new(sum.x / weight, sum.y / weight)
    } else {
        Point::default()
    }
}

/// Places `c` tangent to both `b` and `a`.
fn place(b: Circle, a: Circle, mut c: Circle) -> Circle {
    let dx = b.cx - a.cx;
    let dy = b.cy - a.cy;
    let d2 = dx * dx + dy * dy;
    if d2 > 0.0 {
        let a2 = (a.r + c.r) * (a.r + c.r);
        let b2 = (b.r + c.r) * (b.r + c.r);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.cx = b.cx - x * dx - y * dy;
            c.cy = b.cy - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.cx = a.cx + x * dx - y * dy;
            c.cy = a.cy + x * dy + y * dx;
        }
    } else {
        c.cx = a.cx + c.r;
        c.cy = a.cy;
    }
    c
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - INTERSECT_TOLERANCE;
    let dx = b.cx - a.cx;
    let dy = b.cy - a.cy;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance between the centroid and the weighted tangent point of a chain pair.
fn score(circles: &[Circle], a: usize, b: usize, centroid: Point) -> f64 {
    let (a, b) = (circles[a], circles[b]);
    let ab = a.r + b.r;
    let x = (a.cx * b.r + b.cx * a.r) / ab - centroid.x;
    let y = (a.cy * b.r + b.cy * a.r) / ab - centroid.y;
    x * x + y * y
}

/// Smallest circle enclosing every input circle (move-to-front Welzl).
///
/// Input is visited in a fixed pseudo-random order so results are
/// reproducible across runs.
#[must_use]
pub fn enclosing_circle(circles: &[Circle]) -> Circle {
    if circles.is_empty() {
        return Circle::default();
    }
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled);

    let mut basis: SmallVec<[Circle; 3]> = SmallVec::new();
    let mut enclosing: Option<Circle> = None;
    let mut i = 0;
    while i < shuffled.len() {
        let p = shuffled[i];
        if enclosing.is_some_and(|e| encloses_weak(e, p)) {
            i += 1;
            continue;
        }
        match extend_basis(&basis, p) {
            Some(extended) => {
                basis = extended;
                enclosing = Some(enclose_basis(&basis));
                i = 0;
            }
            None => {
                warn!(count = circles.len(), "enclosing circle basis failed, using cover");
                return covering_circle(circles);
            }
        }
    }
    enclosing.unwrap_or_default()
}

fn shuffle(circles: &mut [Circle]) {
    let mut state: u64 = 1;
    let mut m = circles.len();
    while m > 0 {
        state = (1_664_525 * state + 1_013_904_223) % 4_294_967_296;
        let random = state as f64 / 4_294_967_296.0;
        let i = ((random * m as f64) as usize).min(m - 1);
        m -= 1;
        circles.swap(m, i);
    }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<SmallVec<[Circle; 3]>> {
    if encloses_weak_all(p, basis) {
        return Some(SmallVec::from_slice(&[p]));
    }

    for a in basis {
        if encloses_not(p, *a) && encloses_weak_all(enclose_basis2(*a, p), basis) {
            return Some(SmallVec::from_slice(&[*a, p]));
        }
    }

    for (i, a) in basis.iter().enumerate() {
        for b in &basis[i + 1..] {
            if encloses_not(enclose_basis2(*a, *b), p)
                && encloses_not(enclose_basis2(*a, p), *b)
                && encloses_not(enclose_basis2(*b, p), *a)
                && encloses_weak_all(enclose_basis3(*a, *b, p), basis)
            {
                return Some(SmallVec::from_slice(&[*a, *b, p]));
            }
        }
    }
    None
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.cx - a.cx;
    let dy = b.cy - a.cy;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.cx - a.cx;
    let dy = b.cy - a.cy;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, *b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(*a, *b),
        [a, b, c] => enclose_basis3(*a, *b, *c),
        _ => covering_circle(basis),
    }
}

fn enclose_basis2(a: Circle, b: Circle) -> Circle {
    let x21 = b.cx - a.cx;
    let y21 = b.cy - a.cy;
    let r21 = b.r - a.r;
    let l = x21.hypot(y21);
    if l == 0.0 {
        return if a.r >= b.r { a } else { b };
    }
    Circle::new(
        (a.cx + b.cx + x21 / l * r21) / 2.0,
        (a.cy + b.cy + y21 / l * r21) / 2.0,
        (l + a.r + b.r) / 2.0,
    )
}

fn enclose_basis3(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.cx, a.cy, a.r);
    let (x2, y2, r2) = (b.cx, b.cy, b.r);
    let (x3, y3, r3) = (c.cx, c.cy, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}

/// Non-minimal cover: centered on the weighted centroid.
fn covering_circle(circles: &[Circle]) -> Circle {
    let center = weighted_centroid(circles);
    let r = circles
        .iter()
        .map(|c| center.distance(c.center()) + c.r)
        .fold(0.0, f64::max);
    Circle::new(center.x, center.y, r)
}

/// Packs the subtree under `root` bottom-up and writes circle geometry for
/// every node, normalized so the root becomes the unit circle at the origin.
///
/// Returns the root circle, or `None` when `root` is not in the tree.
pub fn pack_hierarchy(
    tree: &mut NodeTree,
    root: NodeId,
    config: &CirclePackConfig,
) -> Option<Circle> {
    tree.get(root)?;
    let mut local: HashMap<NodeId, Circle> = HashMap::new();
    let root_radius = pack_local(tree, root, config, &mut local);

    let scale = if root_radius > 0.0 { 1.0 / root_radius } else { 1.0 };
    let root_circle = Circle::new(0.0, 0.0, root_radius * scale);
    tree.set_geometry(root, Geometry::Circle(root_circle));

    let mut stack = vec![(root, root_circle.center())];
    while let Some((id, center)) = stack.pop() {
        for member in tree.members(id) {
            let Some(rel) = local.get(&member).copied() else {
                continue;
            };
            let placed = rel.transformed(Point::default(), scale, center);
            tree.set_geometry(member, Geometry::Circle(placed));
            stack.push((member, placed.center()));
        }
    }
    trace!(root = root.raw(), root_radius, scale, "circle hierarchy packed");
    Some(root_circle)
}

fn pack_local(
    tree: &NodeTree,
    id: NodeId,
    config: &CirclePackConfig,
    local: &mut HashMap<NodeId, Circle>,
) -> f64 {
    let members = tree.members(id);
    if members.is_empty() {
        return Circle::radius_for_size(tree.hier_size(id));
    }

    let padding = if config.padding.is_finite() {
        config.padding.max(0.0)
    } else {
        0.0
    };
    let mut entries: Vec<(NodeId, f64)> = members
        .into_iter()
        .map(|member| (member, pack_local(tree, member, config, local)))
        .collect();
    config.order.sort_by_metric(&mut entries, |entry| entry.1);

    let mut circles: Vec<Circle> = entries
        .iter()
        .map(|(_, r)| Circle::new(0.0, 0.0, if *r > 0.0 { r + padding } else { 0.0 }))
        .collect();
    let enclosing = pack_siblings(&mut circles);
    for ((member, r), circle) in entries.iter().zip(&circles) {
        local.insert(*member, Circle::new(circle.cx, circle.cy, *r));
    }

    if enclosing.r > 0.0 {
        enclosing.r + padding
    } else {
        0.0
    }
}
