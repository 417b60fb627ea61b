use toroid_geom::Vec3;

/// Limits shared by picking and collision traces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceParams {
    pub max_steps: usize,
    /// Rays starting at or stepping into `y >= max_height` report no hit.
    pub max_height: i32,
    /// Reported lengths are pulled this far toward zero.
    pub epsilon: f32,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            max_steps: 256,
            max_height: 128,
            epsilon: 1e-3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceResult {
    pub hit: bool,
    /// Last cell visited before the transition.
    pub last_empty: (i32, i32, i32),
    /// First cell on the other side of the transition.
    pub hit_cell: (i32, i32, i32),
    /// Distance to the transition boundary; negative when the ray started inside a hit cell.
    pub length: f32,
}

impl TraceResult {
    fn miss(cell: (i32, i32, i32)) -> Self {
        Self {
            hit: false,
            last_empty: cell,
            hit_cell: cell,
            length: 0.0,
        }
    }
}

#[inline]
fn axis_setup(o: f32, d: f32) -> (i32, f32, f32) {
    if d.abs() < 1e-8 {
        return (0, f32::MAX, f32::MAX);
    }
    let inv = 1.0 / d.abs();
    let f = o - o.floor();
    let step = if d > 0.0 { 1 } else { -1 };
    let t_max = if d > 0.0 { (1.0 - f) * inv } else { f * inv };
    (step, t_max, inv)
}

/// Amanatides–Woo grid walk from `origin` along `dir` until the predicate changes state.
///
/// If the origin cell already satisfies `is_hit`, the ray is reversed and the walk looks for
/// the first cell that does not (the way out of the solid); the length is then negative.
pub fn trace<F>(origin: Vec3, dir: Vec3, params: &TraceParams, mut is_hit: F) -> TraceResult
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let start = origin.floor_cell();
    if dir.length() < 1e-6 || start.1 >= params.max_height {
        return TraceResult::miss(start);
    }
    let inside = is_hit(start.0, start.1, start.2);
    let d = if inside { -dir.normalized() } else { dir.normalized() };

    let (sx, mut tx, dx) = axis_setup(origin.x, d.x);
    let (sy, mut ty, dy) = axis_setup(origin.y, d.y);
    let (sz, mut tz, dz) = axis_setup(origin.z, d.z);

    let (mut x, mut y, mut z) = start;
    for _ in 0..params.max_steps {
        let prev = (x, y, z);
        let t = if tx < ty && tx < tz {
            x += sx;
            let t = tx;
            tx += dx;
            t
        } else if ty < tz {
            y += sy;
            let t = ty;
            ty += dy;
            t
        } else {
            z += sz;
            let t = tz;
            tz += dz;
            t
        };
        if y >= params.max_height {
            return TraceResult::miss(prev);
        }
        if is_hit(x, y, z) != inside {
            let length = (t - params.epsilon).max(0.0);
            return TraceResult {
                hit: true,
                last_empty: prev,
                hit_cell: (x, y, z),
                length: if inside { -length } else { length },
            };
        }
    }
    TraceResult::miss((x, y, z))
}
