use sqlx::{MySql, QueryBuilder};

use crate::modules::property::model::ListingStatus;
use crate::modules::property::schema::SearchPropertiesQuery;

/// Request-scoped search filters.
///
/// Every field is optional and narrows the result independently. Numeric
/// bounds are applied exactly as given: a present `max_price` of `0.0`
/// means "free listings only", not "no bound".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub max_price: Option<f64>,
    pub max_sqft: Option<f64>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub furnishing: Option<String>,
    pub building_type: Option<String>,
    pub parking: Option<String>,
}

impl From<SearchPropertiesQuery> for SearchFilters {
    fn from(query: SearchPropertiesQuery) -> Self {
        Self {
            text: non_blank(query.query),
            max_price: parse_bound(query.max_price),
            max_sqft: parse_bound(query.max_sqft),
            listing_type: non_blank(query.listing_type),
            property_type: non_blank(query.property_type),
            furnishing: non_blank(query.furnishing),
            building_type: non_blank(query.building_type),
            parking: non_blank(query.parking),
        }
    }
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `SELECT` over offerable listings with every present filter ANDed in.
    pub fn build_query(&self) -> QueryBuilder<'static, MySql> {
        let mut qb = QueryBuilder::new("SELECT * FROM properties WHERE status <> ");
        qb.push_bind(ListingStatus::SENTINEL.as_str());
        self.push_conditions(&mut qb);
        qb
    }

    pub fn push_conditions(&self, qb: &mut QueryBuilder<'static, MySql>) {
        if let Some(text) = &self.text {
            let pattern = like_pattern(text);
            qb.push(" AND (LOWER(city) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '!' OR LOWER(area) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '!' OR LOWER(street) LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '!')");
        }

        if let Some(max_price) = self.max_price {
            qb.push(" AND price <= ");
            qb.push_bind(max_price);
        }

        if let Some(max_sqft) = self.max_sqft {
            qb.push(" AND sqft <= ");
            qb.push_bind(max_sqft);
        }

        for (column, value) in self.exact_filters() {
            if let Some(value) = value {
                qb.push(format!(" AND {} = ", column));
                qb.push_bind(value.clone());
            }
        }
    }

    fn exact_filters(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("listing_type", &self.listing_type),
            ("property_type", &self.property_type),
            ("furnishing", &self.furnishing),
            ("building_type", &self.building_type),
            ("parking", &self.parking),
        ]
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Unparsable bounds are dropped instead of rejected.
fn parse_bound(value: Option<String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// `%term%`, lower-cased, with LIKE wildcards in the term escaped by `!`.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.to_lowercase().chars() {
        if matches!(ch, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
