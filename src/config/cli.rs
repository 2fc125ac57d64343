use crate::core::catalog::Catalog;
use crate::domain::model::{Frequency, ItemGroup, SelectionKey};
use std::str::FromStr;

/// `--select GROUP:ID` or `--select GROUP:SERVICE::ID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectArg {
    pub group: ItemGroup,
    pub scope: Option<String>,
    pub id: String,
}

impl FromStr for SelectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected GROUP:ID, got {:?}", s))?;
        let group: ItemGroup = group.parse()?;
        let (scope, id) = match rest.split_once("::") {
            Some((scope, id)) => (Some(scope.trim().to_string()), id.trim()),
            None => (None, rest.trim()),
        };
        if id.is_empty() {
            return Err(format!("missing item id in {:?}", s));
        }
        Ok(Self {
            group,
            scope,
            id: id.to_string(),
        })
    }
}

impl SelectArg {
    pub fn resolve(&self, catalog: &Catalog) -> Option<SelectionKey> {
        catalog
            .find(self.group, self.scope.as_deref(), &self.id)
            .map(|item| item.key())
    }
}

/// `--frequency ID=FREQUENCY` for a program package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyArg {
    pub id: String,
    pub frequency: Frequency,
}

impl FromStr for FrequencyArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, frequency) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ID=FREQUENCY, got {:?}", s))?;
        Ok(Self {
            id: id.trim().to_string(),
            frequency: frequency.parse()?,
        })
    }
}

impl FrequencyArg {
    pub fn resolve(&self, catalog: &Catalog) -> Option<SelectionKey> {
        catalog
            .find(ItemGroup::ProgramPackage, None, &self.id)
            .map(|item| item.key())
    }
}
