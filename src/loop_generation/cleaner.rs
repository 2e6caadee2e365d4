/// How many points ahead `remove_backtracking` looks for a repeat by default.
pub const DEFAULT_BACKTRACK_LOOKAHEAD: usize = 50;

/// Drops every point exactly equal to the one before it.
pub fn dedup_consecutive<T: PartialEq + Copy>(coordinates: &[T]) -> Vec<T> {
    let mut cleaned: Vec<T> = Vec::with_capacity(coordinates.len());
    for &point in coordinates {
        if cleaned.last() != Some(&point) {
            cleaned.push(point);
        }
    }
    cleaned
}

/// Collapses short out-and-back spurs.
///
/// From each kept point the scan looks at indices `i + 2 .. i + lookahead` for
/// the nearest exact repeat and, if one exists, jumps there, discarding the
/// spur in between. Repeats further than `lookahead` points away stay. The
/// jump target is kept as well, so the output can hold the same point twice in
/// a row; `clean_line_coordinates` collapses those.
pub fn remove_backtracking<T: PartialEq + Copy>(coordinates: &[T], lookahead: usize) -> Vec<T> {
    if coordinates.len() < 3 {
        return coordinates.to_vec();
    }

    let mut result = Vec::with_capacity(coordinates.len());
    let mut i = 0;
    while i < coordinates.len() {
        result.push(coordinates[i]);

        let window_end = i.saturating_add(lookahead).min(coordinates.len());
        let repeat = (i + 2..window_end).find(|&j| coordinates[j] == coordinates[i]);

        i = match repeat {
            Some(j) => j,
            None => i + 1,
        };
    }
    result
}

/// Display cleanup for a routed polyline: exact duplicates first, then spurs.
///
/// Spur removal and duplicate collapse repeat until a pass removes nothing,
/// since collapsing one spur can bring the two ends of an enclosing one inside
/// the lookahead window. No two consecutive output points are equal and
/// cleaning the output again returns it unchanged. Axis order is whatever the
/// caller uses, it is never interpreted.
pub fn clean_line_coordinates<T: PartialEq + Copy>(coordinates: &[T], lookahead: usize) -> Vec<T> {
    let mut cleaned = dedup_consecutive(coordinates);
    loop {
        let next = dedup_consecutive(&remove_backtracking(&cleaned, lookahead));
        // every jump and every collapse drops a point
        if next.len() == cleaned.len() {
            return next;
        }
        cleaned = next;
    }
}
