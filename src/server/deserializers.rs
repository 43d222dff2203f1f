use serde::{Deserialize, Deserializer};

// query strings like `?page=abc` fall back to the default instead of rejecting the request
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse::<i64>().ok()))
}

// an empty `searchTerm=` is the same as no search term at all
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_lenient_i64")]
        page: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_non_empty_string")]
        term: Option<String>,
    }

    fn parse(query: &str) -> Params {
        let uri: Uri = format!("/questions?{query}").parse().unwrap();
        Query::<Params>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn page_parses_integers_only() {
        assert_eq!(parse("page=3").page, Some(3));
        assert_eq!(parse("page=-2").page, Some(-2));
        assert_eq!(parse("page=abc").page, None);
        assert_eq!(parse("").page, None);
    }

    #[test]
    fn empty_term_is_none() {
        assert_eq!(parse("term=").term, None);
        assert_eq!(parse("term=lake").term.as_deref(), Some("lake"));
    }
}
