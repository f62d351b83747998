/// Reconcile the text a single-character slot holds after a keystroke.
///
/// Typing over a filled slot momentarily leaves two characters in it: the old
/// one and the new one, in whichever order the caret put them. Given the
/// slot's `current` value and the `raw` text, return the new character.
///
/// * one character or less: returned unchanged
/// * `raw[0] == current`: the user typed after the old character, return `raw[1]`
/// * `raw[1] == current`: the user typed before it, return `raw[0]`
/// * otherwise `raw` is returned as given
///
/// Comparison is per `char`, not per byte.
pub fn resolve_value_update(current: &str, raw: &str) -> String {
    let mut chars = raw.chars();
    let (Some(first), Some(second)) = (chars.next(), chars.next()) else {
        return raw.to_string();
    };

    let mut current_chars = current.chars();
    let current = match (current_chars.next(), current_chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };

    if Some(first) == current {
        second.to_string()
    } else if Some(second) == current {
        first.to_string()
    } else {
        raw.to_string()
    }
}
