/// Builds the `"{year} {make} {model}"` subject used for image searches.
/// Absent or blank parts are left out rather than rendered as empty tokens.
pub fn subject(year: Option<u32>, make: &str, model: &str) -> String {
    let year = year.map(|y| y.to_string());
    [year.as_deref(), Some(make), Some(model)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
