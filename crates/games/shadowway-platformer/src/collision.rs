//! Axis-separated resolution of one moving hitbox against static solids.

use shadowway_core::geometry::Rect;

/// All solids the hitbox currently overlaps, in level order.
pub fn overlapping<'a>(hitbox: &'a Rect, solids: &'a [Rect]) -> impl Iterator<Item = &'a Rect> {
    solids.iter().filter(move |s| hitbox.intersects(s))
}

pub fn touches_any(hitbox: &Rect, solids: &[Rect]) -> bool {
    overlapping(hitbox, solids).next().is_some()
}

/// Push the hitbox out of every solid it overlaps after a horizontal move.
///
/// The overlap set is taken once, before any correction. Each hit zeroes the
/// horizontal velocity and re-syncs `pos_x` from the corrected hitbox.
pub fn resolve_horizontal(hitbox: &mut Rect, pos_x: &mut f32, vel_x: &mut f32, solids: &[Rect]) {
    let hits: Vec<Rect> = overlapping(hitbox, solids).copied().collect();
    for solid in hits {
        if *vel_x > 0.0 {
            hitbox.set_right(solid.left());
        } else if *vel_x < 0.0 {
            hitbox.set_left(solid.right());
        }
        *pos_x = hitbox.x as f32;
        *vel_x = 0.0;
    }
}

/// Outcome of a vertical resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalContact {
    pub landed: bool,
    pub hit_ceiling: bool,
}

/// Resolve a vertical move, nearest top edge first.
///
/// A solid only catches a falling hitbox whose centre is still above
/// `solid.top + half_height`, and only stops a rising one whose centre is
/// below `solid.bottom - half_height`. Hitboxes beside a tall solid pass
/// through untouched here and are handled by the horizontal pass.
pub fn resolve_vertical(
    hitbox: &mut Rect,
    pos_y: &mut f32,
    vel_y: &mut f32,
    solids: &[Rect],
    half_height: f32,
) -> VerticalContact {
    let mut hits: Vec<Rect> = overlapping(hitbox, solids).copied().collect();
    hits.sort_by_key(Rect::top);

    let mut contact = VerticalContact::default();
    for solid in hits {
        let centre = hitbox.center_y() as f32;
        if *vel_y > 0.0 && hitbox.bottom() > solid.top() {
            if centre < solid.top() as f32 + half_height {
                hitbox.set_bottom(solid.top());
                *vel_y = 0.0;
                *pos_y = hitbox.y as f32;
                contact.landed = true;
            }
        } else if *vel_y < 0.0 && hitbox.top() < solid.bottom() {
            if centre > solid.bottom() as f32 - half_height {
                hitbox.set_top(solid.bottom());
                *vel_y = 0.0;
                *pos_y = hitbox.y as f32;
                contact.hit_ceiling = true;
            }
        }
    }
    contact
}
