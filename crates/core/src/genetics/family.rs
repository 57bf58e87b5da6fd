use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::path::Path;

use crate::error::{HeredityError, Result};

/// Input record for one person, as supplied by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub name: String,
    pub mother: Option<String>,
    pub father: Option<String>,
    /// Observed trait: `Some(true)` present, `Some(false)` absent, `None`
    /// unknown.
    pub observed_trait: Option<bool>,
}

impl PersonRecord {
    /// A founder with no observed trait.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mother: None,
            father: None,
            observed_trait: None,
        }
    }

    pub fn with_parents(mut self, mother: &str, father: &str) -> Self {
        self.mother = Some(mother.to_string());
        self.father = Some(father.to_string());
        self
    }

    pub fn with_trait(mut self, present: bool) -> Self {
        self.observed_trait = Some(present);
        self
    }
}

/// A resolved person: parents are indices into the family.
#[derive(Debug, Clone)]
struct Person {
    name: String,
    mother: Option<usize>,
    father: Option<usize>,
    observed_trait: Option<bool>,
}

/// An immutable, validated population of people.
///
/// People keep the order they were given in. Either both parents of a person
/// are known or neither is, every parent resolves to another member, and the
/// parent graph is acyclic. These checks run once at construction, so a
/// `Family` value is always well formed.
#[derive(Debug, Clone)]
pub struct Family {
    people: Vec<Person>,
    name_to_index: HashMap<String, usize>,
}

impl Family {
    /// Build a family from in-memory records.
    ///
    /// Parents may appear after their children.
    ///
    /// # Errors
    /// Returns [`HeredityError::Family`] for duplicate names, a person with
    /// only one parent, a parent that is not in the family, a person listed
    /// as their own parent, or a cycle in the parent graph.
    pub fn from_records(records: &[PersonRecord]) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(records.len());

        // First pass: register all names so parent lookups succeed
        // regardless of input order.
        for (i, rec) in records.iter().enumerate() {
            if name_to_index.insert(rec.name.clone(), i).is_some() {
                return Err(HeredityError::Family(format!(
                    "Duplicate person name: '{}'",
                    rec.name
                )));
            }
        }

        // Second pass: resolve parents.
        let mut people = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let (mother, father) = match (&rec.mother, &rec.father) {
                (None, None) => (None, None),
                (Some(m), Some(f)) => (
                    Some(resolve_parent(&name_to_index, &rec.name, "mother", m, i)?),
                    Some(resolve_parent(&name_to_index, &rec.name, "father", f, i)?),
                ),
                _ => {
                    return Err(HeredityError::Family(format!(
                        "Person '{}' must have both a mother and a father, or neither",
                        rec.name
                    )));
                }
            };

            people.push(Person {
                name: rec.name.clone(),
                mother,
                father,
                observed_trait: rec.observed_trait,
            });
        }

        let family = Self {
            people,
            name_to_index,
        };
        family.check_acyclic()?;
        Ok(family)
    }

    /// Read a family from a CSV file.
    ///
    /// Expected columns (header required): `name`, `mother`, `father`,
    /// `trait`. Unknown parents are left blank. `trait` is `1` when the trait
    /// is present, `0` when absent and blank when unknown.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a column is missing, a
    /// trait value is not recognised, or the family fails validation.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Read a family in CSV form from any reader. See [`Family::from_csv`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                HeredityError::Family(format!("CSV missing '{}' column", name))
            })
        };
        let name_col = column("name")?;
        let mother_col = column("mother")?;
        let father_col = column("father")?;
        let trait_col = column("trait")?;

        let mut records = Vec::new();

        for result in reader.records() {
            let record = result?;
            let field = |col: usize, what: &'static str| {
                record.get(col).ok_or_else(|| {
                    HeredityError::Family(format!("Missing {} field in row", what))
                })
            };

            let name = field(name_col, "name")?;
            if name.is_empty() {
                return Err(HeredityError::Family("Empty person name".to_string()));
            }

            records.push(PersonRecord {
                name: name.to_string(),
                mother: parse_parent(field(mother_col, "mother")?),
                father: parse_parent(field(father_col, "father")?),
                observed_trait: parse_trait(name, field(trait_col, "trait")?)?,
            });
        }

        Self::from_records(&records)
    }

    /// Number of people in the family.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Look up the index of a person by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Name of the person at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn name(&self, index: usize) -> &str {
        &self.people[index].name
    }

    pub fn mother(&self, index: usize) -> Option<usize> {
        self.people[index].mother
    }

    pub fn father(&self, index: usize) -> Option<usize> {
        self.people[index].father
    }

    /// `(mother, father)` of the person at `index`, if both are known.
    pub fn parents(&self, index: usize) -> Option<(usize, usize)> {
        let person = &self.people[index];
        person.mother.zip(person.father)
    }

    /// Observed trait of the person at `index`, if any.
    pub fn observed_trait(&self, index: usize) -> Option<bool> {
        self.people[index].observed_trait
    }

    /// Indices of people without parents in the family.
    pub fn founders(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.parents(i).is_none())
            .collect()
    }

    /// Number of people whose trait is observed.
    pub fn n_observed(&self) -> usize {
        self.people
            .iter()
            .filter(|p| p.observed_trait.is_some())
            .count()
    }

    /// Iterate over person names in input order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.people.iter().map(|p| p.name.as_str())
    }

    /// Cycle detection via Kahn's algorithm over parent -> child edges.
    fn check_acyclic(&self) -> Result<()> {
        let n = self.people.len();
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];

        for (i, person) in self.people.iter().enumerate() {
            for parent in [person.mother, person.father].into_iter().flatten() {
                children_of[parent].push(i);
                in_degree[i] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;

        while let Some(node) = queue.pop_front() {
            visited += 1;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if visited != n {
            return Err(HeredityError::Family(
                "Family contains a cycle: a person is their own ancestor".to_string(),
            ));
        }

        Ok(())
    }
}

fn resolve_parent(
    name_to_index: &HashMap<String, usize>,
    child: &str,
    role: &str,
    parent: &str,
    child_index: usize,
) -> Result<usize> {
    let index = name_to_index.get(parent).copied().ok_or_else(|| {
        HeredityError::Family(format!(
            "Person '{}' references unknown {} '{}'",
            child, role, parent
        ))
    })?;
    if index == child_index {
        return Err(HeredityError::Family(format!(
            "Person '{}' is listed as their own {}",
            child, role
        )));
    }
    Ok(index)
}

/// Parse a parent field, returning `None` when blank.
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a trait field: `1` present, `0` absent, blank unknown.
fn parse_trait(name: &str, s: &str) -> Result<Option<bool>> {
    match s.trim() {
        "" => Ok(None),
        "1" => Ok(Some(true)),
        "0" => Ok(Some(false)),
        other => Err(HeredityError::Family(format!(
            "Person '{}' has unrecognised trait value '{}' (expected 0, 1 or blank)",
            name, other
        ))),
    }
}
