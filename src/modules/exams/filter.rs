//! WHERE-clause construction for exam searches.

use mashar_models::exams::ExamFilter;

use crate::middleware::scope::ScopeContext;

/// A WHERE clause over `exams` together with its positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamQuery {
    pub where_clause: String,
    pub params: Vec<String>,
}

impl ExamQuery {
    /// Branch-scoped query; private exams are hidden from non-admins
    /// other than their creator.
    pub fn new(branch: &str, ctx: &ScopeContext) -> Self {
        let mut query = Self {
            where_clause: String::from(" WHERE branch = $1"),
            params: vec![branch.to_string()],
        };
        if !ctx.is_admin() {
            let n = query.push_param(ctx.username.clone());
            query
                .where_clause
                .push_str(&format!(" AND (NOT is_private OR created_by = ${n})"));
        }
        query
    }

    fn push_param(&mut self, value: String) -> usize {
        self.params.push(value);
        self.params.len()
    }

    fn eq(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let n = self.push_param(value.to_string());
            self.where_clause.push_str(&format!(" AND {column} = ${n}"));
        }
        self
    }

    pub fn year(&mut self, year: Option<&str>) -> &mut Self {
        self.eq("year", year)
    }

    pub fn filter(&mut self, filter: &ExamFilter) -> &mut Self {
        self.eq("year", filter.year.as_deref())
            .eq("class_grade", filter.class_grade.as_deref())
            .eq("period", filter.period.as_deref())
            .eq("eval_type", filter.eval_type.as_deref())
            .eq("chance", filter.chance.as_deref());

        if let Some(subject) = filter.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let n = self.push_param(subject.to_string());
            self.where_clause
                .push_str(&format!(" AND subject @> jsonb_build_array(${n}::text)"));
        }
        if let Some(name) = filter.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let n = self.push_param(format!("%{}%", escape_like(name)));
            self.where_clause.push_str(&format!(" AND name ILIKE ${n}"));
        }
        if let Some(is_private) = filter.is_private {
            let n = self.push_param(is_private.to_string());
            self.where_clause
                .push_str(&format!(" AND is_private = ${n}::boolean"));
        }
        self
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mashar_auth::Role;

    fn ctx(role: Role) -> ScopeContext {
        ScopeContext {
            username: "dana@mashar.org".to_string(),
            role,
            branch: "ksv".to_string(),
        }
    }

    #[test]
    fn test_admin_sees_private_exams() {
        let query = ExamQuery::new("ksv", &ctx(Role::Admin));
        assert_eq!(query.where_clause, " WHERE branch = $1");
        assert_eq!(query.params, vec!["ksv"]);
    }

    #[test]
    fn test_teacher_sees_own_private_exams_only() {
        let query = ExamQuery::new("ksv", &ctx(Role::Teacher));
        assert_eq!(
            query.where_clause,
            " WHERE branch = $1 AND (NOT is_private OR created_by = $2)"
        );
        assert_eq!(query.params, vec!["ksv", "dana@mashar.org"]);
    }

    #[test]
    fn test_filter_numbers_parameters_in_order() {
        let filter = ExamFilter {
            year: Some("2025".to_string()),
            subject: Some("optics".to_string()),
            name: Some("50%_off".to_string()),
            is_private: Some(false),
            class_grade: Some("  ".to_string()),
            ..ExamFilter::default()
        };
        let mut query = ExamQuery::new("ksv", &ctx(Role::Admin));
        query.filter(&filter);

        assert_eq!(
            query.where_clause,
            " WHERE branch = $1 AND year = $2 AND subject @> jsonb_build_array($3::text) \
             AND name ILIKE $4 AND is_private = $5::boolean"
        );
        assert_eq!(
            query.params,
            vec!["ksv", "2025", "optics", "%50\\%\\_off%", "false"]
        );
    }
}
