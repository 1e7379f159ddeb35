// src/models/summary.rs
use crate::models::review::Rating;
use serde::Serialize;

/// Review count and mean rating for one listing, derived on every read.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    /// Mean rating rounded to one decimal, `None` when there are no reviews.
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
}

impl Summary {
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (count, total) = ratings
            .into_iter()
            .fold((0usize, 0u64), |(n, sum), r| (n + 1, sum + u64::from(r.value())));

        let average_rating = if count == 0 {
            None
        } else {
            let mean = total as f64 / count as f64;
            Some((mean * 10.0).round() / 10.0)
        };

        Summary {
            count,
            average_rating,
        }
    }

    /// `"N/A"` for an unreviewed listing, otherwise the average with one decimal.
    pub fn display_rating(&self) -> String {
        match self.average_rating {
            Some(avg) => format!("{avg:.1}"),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(values: &[i64]) -> Vec<Rating> {
        values.iter().map(|v| Rating::new(*v).unwrap()).collect()
    }

    #[test]
    fn empty_target_has_no_average() {
        let summary = Summary::from_ratings(Vec::<Rating>::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, None);
        assert_eq!(summary.display_rating(), "N/A");
    }

    #[test]
    fn whole_average() {
        let summary = Summary::from_ratings(ratings(&[5, 4, 3]));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(summary.display_rating(), "4.0");
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let summary = Summary::from_ratings(ratings(&[4, 4, 5]));
        assert_eq!(summary.average_rating, Some(4.3));

        let summary = Summary::from_ratings(ratings(&[5, 4]));
        assert_eq!(summary.display_rating(), "4.5");
    }

    #[test]
    fn serializes_missing_average_as_null() {
        let value = serde_json::to_value(Summary::from_ratings(Vec::<Rating>::new())).unwrap();
        assert_eq!(value, serde_json::json!({ "count": 0, "averageRating": null }));
    }
}
