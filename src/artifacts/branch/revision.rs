use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::{MIN_ABBREV_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::TwigError;
use anyhow::Context;

/// A revision spec naming a commit
///
/// - Branch names and `HEAD` (alias `@`)
/// - Full or abbreviated (at least 4 hex characters) commit ids, tried only
///   when no branch has that name
/// - `<revision>^`: first parent
/// - `<revision>~<n>`: n-th ancestor following first parents
#[derive(Debug, Clone)]
pub enum Revision {
    Ref(BranchName),
    Ancestor(Box<Revision>, usize),
    Parent(Box<Revision>),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_re = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_re = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_re.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_re.captures(revision) {
            let generations: usize = caps[2].parse().map_err(|_| {
                TwigError::not_found(format!("unknown revision: {}", revision))
            })?;
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else {
            let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
            let branch_name = BranchName::try_parse(resolved_name).map_err(|_| {
                TwigError::not_found(format!("unknown revision: {}", revision))
            })?;
            Ok(Revision::Ref(branch_name))
        }
    }

    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Ref(name) => Self::resolve_ref(name, repository),
            Revision::Parent(base_revision) => {
                Self::resolve_commit_parent(&base_revision.resolve(repository)?, repository)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(&oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_ref(name: &BranchName, repository: &Repository) -> anyhow::Result<ObjectId> {
        let refs = repository.refs();

        if name.as_ref() == HEAD_REF_NAME {
            return refs.read_head()?.ok_or_else(|| {
                TwigError::not_found("HEAD does not point to a commit yet").into()
            });
        }

        if refs.branch_exists(name) {
            return refs.read_branch(name)?.ok_or_else(|| {
                TwigError::not_found(format!("branch {} has no commits yet", name)).into()
            });
        }

        if Self::looks_like_oid(name.as_ref()) {
            return Self::resolve_oid(name.as_ref(), repository);
        }

        anyhow::bail!(TwigError::not_found(format!("unknown revision: {}", name)))
    }

    fn resolve_commit_parent(oid: &ObjectId, repository: &Repository) -> anyhow::Result<ObjectId> {
        let commit = repository.database().parse_commit(oid)?;

        commit.parent().cloned().ok_or_else(|| {
            TwigError::not_found(format!("commit {} has no parent", oid.to_short_oid())).into()
        })
    }

    fn resolve_oid(prefix: &str, repository: &Repository) -> anyhow::Result<ObjectId> {
        let database = repository.database();

        if prefix.len() == OBJECT_ID_LENGTH {
            let oid = ObjectId::try_parse(prefix.to_string())?;
            if !database.commit_exists(&oid) {
                anyhow::bail!(TwigError::not_found(format!("commit {} not found", oid)));
            }
            return Ok(oid);
        }

        let mut matches = database.find_commits_by_prefix(prefix)?;
        match matches.len() {
            0 => anyhow::bail!(TwigError::not_found(format!("unknown revision: {}", prefix))),
            1 => Ok(matches.remove(0)),
            _ => {
                let candidates = matches
                    .iter()
                    .map(|oid| format!("\n  {}", oid.to_short_oid()))
                    .collect::<String>();
                anyhow::bail!(TwigError::not_found(format!(
                    "short id {} is ambiguous; candidates:{}",
                    prefix, candidates
                )))
            }
        }
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= MIN_ABBREV_LENGTH && ObjectId::is_valid_prefix(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base_name(revision: &Revision) -> &str {
        match revision {
            Revision::Ref(name) => name.as_ref(),
            Revision::Parent(base) | Revision::Ancestor(base, _) => base_name(base),
        }
    }

    #[test]
    fn at_is_an_alias_for_head() {
        let revision = Revision::try_parse("@").unwrap();
        assert!(matches!(revision, Revision::Ref(ref name) if name.as_ref() == "HEAD"));
    }

    #[test]
    fn caret_and_tilde_nest() {
        let revision = Revision::try_parse("main~3^").unwrap();

        let Revision::Parent(inner) = revision else {
            panic!("expected parent");
        };
        assert!(matches!(*inner, Revision::Ancestor(_, 3)));
        assert_eq!(base_name(&inner), "main");
    }

    #[test]
    fn invalid_name_is_not_found() {
        let error = Revision::try_parse("bad..name").unwrap_err();
        assert!(matches!(
            TwigError::kind_of(&error),
            Some(TwigError::NotFound(_))
        ));
    }

    #[test]
    fn oversized_generation_count_is_not_found() {
        let error = Revision::try_parse("HEAD~99999999999999999999").unwrap_err();
        assert!(matches!(
            TwigError::kind_of(&error),
            Some(TwigError::NotFound(_))
        ));
    }

    #[test]
    fn short_hex_is_not_an_oid() {
        assert!(!Revision::looks_like_oid("abc"));
        assert!(Revision::looks_like_oid("abcd"));
        assert!(!Revision::looks_like_oid("abcz"));
    }

    proptest! {
        #[test]
        fn parent_suffixes_nest(name in "[a-z][a-z0-9_-]{0,12}", depth in 1usize..5) {
            let spec = format!("{}{}", name, "^".repeat(depth));
            let mut revision = Revision::try_parse(&spec).unwrap();

            for _ in 0..depth {
                let Revision::Parent(base) = revision else {
                    panic!("expected parent in {spec}");
                };
                revision = *base;
            }
            prop_assert_eq!(base_name(&revision), name.as_str());
        }

        #[test]
        fn ancestor_generations_are_kept(name in "[a-z][a-z0-9_-]{0,12}", generations in 0usize..100) {
            let revision = Revision::try_parse(&format!("{}~{}", name, generations)).unwrap();
            prop_assert!(matches!(revision, Revision::Ancestor(_, n) if n == generations));
        }
    }
}
