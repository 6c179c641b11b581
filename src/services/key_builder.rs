//! Stable reading identifiers
//!
//! The device exposes no identifiers for individual values, so keys are
//! derived from display names only: the menu entry name followed by the
//! names of the nested `item` groups, joined with `_`, spaces dashed.
//! Two leaves with the same name-path yield the same key.

/// Segment separator inside a key
pub const KEY_SEPARATOR: &str = "_";

/// Build the key of a leaf value.
///
/// `ancestors` are the enclosing `item` names collected while walking up from
/// the value element, innermost first. `menu_name` is the name of the
/// top-level menu entry that was queried and becomes the outermost segment.
///
/// ```
/// use luxtronik_ws::services::key_builder::build_key;
///
/// assert_eq!(build_key(["Eingänge"], "Temperaturen"), "Temperaturen_Eingänge");
/// assert_eq!(
///     build_key(["Outside Temp", "Inputs"], "Heat Pump"),
///     "Heat-Pump_Inputs_Outside-Temp"
/// );
/// ```
pub fn build_key<I, S>(ancestors: I, menu_name: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segments: Vec<String> = ancestors
        .into_iter()
        .map(|segment| segment.as_ref().to_string())
        .collect();
    segments.push(menu_name.to_string());
    segments.reverse();

    segments.join(KEY_SEPARATOR).replace(' ', "-")
}

/// Last segment of a key, used as the human-readable entity name
pub fn display_name(key: &str) -> &str {
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}
