//! Required-header contracts for bulk user spreadsheets.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Password,
    Role,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::Role => "role",
        }
    }

    /// Accepted header spellings, already in normalized (unaccented) form.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            UserField::Name => &["nome", "name"],
            UserField::Email => &["email", "e-mail", "e mail"],
            UserField::Password => &["senha", "password"],
            UserField::Role => &["perfil", "role", "tipo", "papel"],
        }
    }

    fn matches(&self, header: &str) -> bool {
        self.aliases().contains(&header)
    }
}

/// The columns an upload must carry and the header row its template uses.
#[derive(Debug, Clone, Copy)]
pub struct HeaderContract {
    pub fields: &'static [UserField],
    pub template_headers: &'static [&'static str],
}

pub const CREATE_CONTRACT: HeaderContract = HeaderContract {
    fields: &[UserField::Name, UserField::Email, UserField::Password, UserField::Role],
    template_headers: &["nome", "email", "senha", "perfil"],
};

pub const DELETE_CONTRACT: HeaderContract = HeaderContract {
    fields: &[UserField::Email],
    template_headers: &["email"],
};

/// Trim, case-fold, drop diacritics and collapse runs of inner whitespace.
pub fn normalize_header(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Column index bound to each field of a contract.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    bindings: Vec<(UserField, usize)>,
}

impl ColumnMap {
    /// Bind every contract field to the first header cell matching one of its
    /// aliases. Fails when any field stays unbound.
    pub fn resolve(contract: &HeaderContract, header: &[String]) -> Result<Self> {
        let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();

        let mut bindings = Vec::with_capacity(contract.fields.len());
        let mut missing = Vec::new();

        for field in contract.fields {
            match normalized.iter().position(|h| field.matches(h)) {
                Some(index) => bindings.push((*field, index)),
                None => missing.push(field.as_str()),
            }
        }

        if !missing.is_empty() {
            return Err(AppError::InvalidFile(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { bindings })
    }

    pub fn index_of(&self, field: UserField) -> Option<usize> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == field)
            .map(|(_, index)| *index)
    }

    /// Trimmed text of `field` in `row`; a short row reads as empty.
    pub fn value(&self, row: &[String], field: UserField) -> String {
        self.index_of(field)
            .and_then(|index| row.get(index))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  E   Mail "), "e mail");
        assert_eq!(normalize_header("SENHA"), "senha");
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("Pápel"), "papel");
        assert_eq!(normalize_header(" E-MAÍL "), "e-mail");
    }

    #[test]
    fn test_accented_headers_resolve() {
        let columns = ColumnMap::resolve(
            &CREATE_CONTRACT,
            &header(&["Nóme", "É-mail", "Sênha", "Pérfil"]),
        )
        .unwrap();

        assert_eq!(columns.index_of(UserField::Name), Some(0));
        assert_eq!(columns.index_of(UserField::Email), Some(1));
        assert_eq!(columns.index_of(UserField::Password), Some(2));
        assert_eq!(columns.index_of(UserField::Role), Some(3));
    }

    #[test]
    fn test_resolve_create_contract_with_aliases() {
        let columns = ColumnMap::resolve(
            &CREATE_CONTRACT,
            &header(&["Perfil", " NOME ", "E-mail", "password"]),
        )
        .unwrap();

        assert_eq!(columns.index_of(UserField::Role), Some(0));
        assert_eq!(columns.index_of(UserField::Name), Some(1));
        assert_eq!(columns.index_of(UserField::Email), Some(2));
        assert_eq!(columns.index_of(UserField::Password), Some(3));
    }

    #[test]
    fn test_first_matching_column_wins() {
        let columns = ColumnMap::resolve(
            &DELETE_CONTRACT,
            &header(&["notes", "email", "e-mail"]),
        )
        .unwrap();
        assert_eq!(columns.index_of(UserField::Email), Some(1));
    }

    #[test]
    fn test_missing_columns_listed_in_contract_order() {
        let err = ColumnMap::resolve(&CREATE_CONTRACT, &header(&["email", "nome"])).unwrap_err();
        match err {
            AppError::InvalidFile(msg) => assert_eq!(msg, "missing columns: password, role"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_value_of_short_row_is_empty() {
        let columns = ColumnMap::resolve(&CREATE_CONTRACT, &header(&["nome", "email", "senha", "perfil"])).unwrap();
        let row = header(&["  Ana ", "ana@x.com"]);
        assert_eq!(columns.value(&row, UserField::Name), "Ana");
        assert_eq!(columns.value(&row, UserField::Role), "");
    }
}
