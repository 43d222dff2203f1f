pub const QUESTIONS_PER_PAGE: usize = 10;

/// Returns the 1-based `page` window of `items`; empty for pages before 1 or past the end.
pub fn paginate<T>(items: Vec<T>, page: i64) -> Vec<T> {
    let Some(start) = usize::try_from(page.saturating_sub(1))
        .ok()
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
    else {
        return Vec::new();
    };
    items
        .into_iter()
        .skip(start)
        .take(QUESTIONS_PER_PAGE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_partition_the_list() {
        let items: Vec<i32> = (1..=25).collect();
        let mut seen = Vec::new();
        for page in 1..=3 {
            let window = paginate(items.clone(), page);
            assert!(window.len() <= QUESTIONS_PER_PAGE);
            seen.extend(window);
        }
        assert_eq!(seen, items);
        assert!(paginate(items, 4).is_empty());
    }

    #[test]
    fn pages_before_first_are_empty() {
        let items: Vec<i32> = (1..=5).collect();
        assert!(paginate(items.clone(), 0).is_empty());
        assert!(paginate(items.clone(), -3).is_empty());
        assert!(paginate(items, i64::MIN).is_empty());
    }

    #[test]
    fn huge_page_does_not_overflow() {
        assert!(paginate(vec![1, 2, 3], i64::MAX).is_empty());
    }
}
