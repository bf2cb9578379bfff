//! Type definitions of a low-level SQL string representation.

/// The SQL dialect a statement is rendered in. The two backends share one
/// AST and differ only here and in a few operator spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

/// A rendered SQL string with the parameters to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SQL {
    pub dialect: Dialect,
    pub sql: String,
    pub params: Vec<Param>,
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SQL {
    pub fn new(dialect: Dialect) -> SQL {
        SQL {
            dialect,
            sql: String::new(),
            params: vec![],
        }
    }

    /// Append raw SQL syntax.
    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a quoted identifier, doubling any embedded quote. Sqlite gets
    /// backticks: it reads an unknown double-quoted identifier as a string
    /// literal, so a misspelled column would silently select its own name
    /// instead of failing.
    pub fn append_identifier(&mut self, name: &str) {
        let (quote, escaped) = match self.dialect {
            Dialect::Postgres => ('"', name.replace('"', "\"\"")),
            Dialect::Sqlite => ('`', name.replace('`', "``")),
        };
        self.sql.push(quote);
        self.sql.push_str(&escaped);
        self.sql.push(quote);
    }

    /// Append a placeholder in the dialect's syntax and record the parameter.
    pub fn append_param(&mut self, param: Param) {
        self.params.push(param);
        match self.dialect {
            Dialect::Postgres => {
                self.sql.push('$');
                self.sql.push_str(&self.params.len().to_string());
            }
            Dialect::Sqlite => self.sql.push('?'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        let mut sql = SQL::new(Dialect::Postgres);
        sql.append_identifier("weird\"name");
        assert_eq!(sql.sql, "\"weird\"\"name\"");
    }

    #[test]
    fn sqlite_identifiers_use_backticks() {
        // Double quotes would fall back to a string literal for unknown
        // names; backticks always mean an identifier.
        let mut sql = SQL::new(Dialect::Sqlite);
        sql.append_identifier("weird`name");
        assert_eq!(sql.sql, "`weird``name`");
    }

    #[test]
    fn placeholders_follow_the_dialect() {
        let mut pg = SQL::new(Dialect::Postgres);
        pg.append_param(Param::String("a".to_string()));
        pg.append_param(Param::Int(2));
        assert_eq!(pg.sql, "$1$2");

        let mut lite = SQL::new(Dialect::Sqlite);
        lite.append_param(Param::String("a".to_string()));
        lite.append_param(Param::Int(2));
        assert_eq!(lite.sql, "??");
    }
}
