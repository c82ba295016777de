//! Compiles [`Predicate`] trees into PostgreSQL/PostGIS boolean
//! expressions over the `events e` alias.

use dao_utils::SqlParams;
use events_filters::{Condition, FlagField, Predicate, TextMatch, TimeField};
use events_queries::EventOrder;

const ENGLISH: &str = "'english'";

fn time_column(field: TimeField) -> &'static str {
    match field {
        TimeField::Start => "e.start_date",
        TimeField::End => "e.end_date",
        TimeField::Created => "e.created_at",
        TimeField::Updated => "e.updated_at",
    }
}

fn flag_column(field: FlagField) -> &'static str {
    match field {
        FlagField::Featured => "e.is_featured",
        FlagField::StaffPicked => "e.is_staff_picked",
        FlagField::HasLocation => "e.has_location",
    }
}

/// Escapes LIKE wildcards so the term only matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn similarity_expr(term: &str) -> String {
    format!("GREATEST(similarity(e.name, {term}), similarity(e.description, {term}))")
}

fn join(parts: &[Predicate], operator: &str, params: &mut SqlParams) -> String {
    let compiled: Vec<String> = parts.iter().map(|p| compile(p, params)).collect();
    format!("({})", compiled.join(operator))
}

pub fn compile(predicate: &Predicate, params: &mut SqlParams) -> String {
    match predicate {
        Predicate::All => "TRUE".to_string(),
        Predicate::Nothing => "FALSE".to_string(),
        Predicate::Leaf(condition) => compile_condition(condition, params),
        Predicate::Not(inner) => format!("NOT {}", compile(inner, params)),
        Predicate::And(parts) => join(parts, " AND ", params),
        Predicate::Or(parts) => join(parts, " OR ", params),
    }
}

fn compile_condition(condition: &Condition, params: &mut SqlParams) -> String {
    match condition {
        Condition::TimeRange { field, from, to } => {
            let column = time_column(*field);
            match (from, to) {
                (Some(from), Some(to)) => format!(
                    "({column} >= {} AND {column} <= {})",
                    params.push(*from),
                    params.push(*to)
                ),
                (Some(from), None) => format!("{column} >= {}", params.push(*from)),
                (None, Some(to)) => format!("{column} <= {}", params.push(*to)),
                (None, None) => "TRUE".to_string(),
            }
        }
        Condition::Flag { field, value } => {
            format!("{} = {}", flag_column(*field), params.push(*value))
        }
        Condition::Viewable => {
            "(e.status = 'active' AND e.visibility = 'public')".to_string()
        }
        Condition::PriceTagged(tier) => format!(
            "e.prices_available @> ARRAY[{}]::text[]",
            params.push(tier.as_str().to_string())
        ),
        Condition::WithinDistance { origin, meters } => format!(
            "ST_DWithin(e.point, ST_SetSRID(ST_MakePoint({}, {}), 4326)::geography, {})",
            params.push(origin.longitude),
            params.push(origin.latitude),
            params.push(*meters)
        ),
        Condition::InCategories(slugs) => format!(
            "EXISTS (SELECT 1 FROM event_categories ec \
             JOIN categories c ON c.id = ec.category_id \
             WHERE ec.event_id = e.id AND c.slug = ANY({}))",
            params.push(slugs.clone())
        ),
        Condition::LocatedInCities(ids) => format!(
            "EXISTS (SELECT 1 FROM event_locations el \
             WHERE el.event_id = e.id AND el.city_id = ANY({}))",
            params.push(ids.clone())
        ),
        Condition::AtVenue(venue) => format!(
            "EXISTS (SELECT 1 FROM event_locations el \
             WHERE el.event_id = e.id AND el.venue_slug = {})",
            params.push(venue.clone())
        ),
        Condition::HasAnyLocation => {
            "EXISTS (SELECT 1 FROM event_locations el WHERE el.event_id = e.id)"
                .to_string()
        }
        Condition::Text(matcher) => compile_text(matcher, params),
    }
}

fn compile_text(matcher: &TextMatch, params: &mut SqlParams) -> String {
    match matcher {
        TextMatch::Phrase(term) => {
            let phrase = params.push(term.clone());
            let prefix = params.push(format!("{}%", escape_like(term)));
            format!(
                "(to_tsvector({ENGLISH}, e.name || ' ' || e.description) \
                 @@ phraseto_tsquery({ENGLISH}, {phrase}) OR e.name ILIKE {prefix})"
            )
        }
        TextMatch::NamePrefix(term) => {
            format!("e.name ILIKE {}", params.push(format!("{}%", escape_like(term))))
        }
        TextMatch::Similar { term, threshold } => {
            let term = params.push(term.clone());
            let threshold = params.push(*threshold);
            format!("{} > {threshold}::float8", similarity_expr(&term))
        }
        TextMatch::Contains(term) => {
            let pattern = params.push(format!("%{}%", escape_like(term)));
            format!("(e.name ILIKE {pattern} OR e.description ILIKE {pattern})")
        }
    }
}

/// ORDER BY clause for `order`; ties always break on id.
pub fn order_by(order: &EventOrder, params: &mut SqlParams) -> String {
    let primary = match order {
        EventOrder::StartAsc => "e.start_date ASC".to_string(),
        EventOrder::StartDesc => "e.start_date DESC".to_string(),
        EventOrder::EndDesc => "e.end_date DESC".to_string(),
        EventOrder::CreatedDesc => "e.created_at DESC".to_string(),
        EventOrder::Similarity(term) => {
            format!("{} DESC", similarity_expr(&params.push(term.clone())))
        }
    };
    format!("ORDER BY {primary}, e.id ASC")
}
