use super::{Preset, Profile};
use crate::error::{AlignError, AlignResult};
use crate::range::{satisfies, NpmRange};

/// A parsed `name@range` constraint.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub range: NpmRange,
}

/// Split `name@range` at the last `@`, so scoped names like
/// `@scope/pkg@^1.0` keep their leading `@`.
pub fn parse_requirement(requirement: &str) -> AlignResult<Requirement> {
    let Some(index) = requirement.rfind('@') else {
        return Err(AlignError::InvalidRequirement(requirement.to_string()));
    };
    let name = requirement[..index].trim();
    if name.is_empty() {
        return Err(AlignError::InvalidRequirement(requirement.to_string()));
    }
    let range = NpmRange::parse(&requirement[index + 1..])
        .map_err(|_| AlignError::InvalidVersionRange(requirement.to_string()))?;
    Ok(Requirement { name: name.to_string(), range })
}

pub fn parse_requirements<S: AsRef<str>>(requirements: &[S]) -> AlignResult<Vec<Requirement>> {
    requirements.iter().map(|r| parse_requirement(r.as_ref())).collect()
}

/// Whether some concrete package in `profile` matches every requirement.
pub fn profile_satisfies(profile: &Profile, requirements: &[Requirement]) -> bool {
    requirements.iter().all(|req| {
        profile.values().filter_map(|entry| entry.as_package()).any(|pkg| {
            pkg.name == req.name && satisfies(&pkg.version, &req.range)
        })
    })
}

/// Narrow `preset` to the profiles that satisfy every requirement, keeping order.
///
/// An empty result is not an error here; see [`ensure_profiles`].
pub fn filter_preset<S: AsRef<str>>(preset: &Preset, requirements: &[S]) -> AlignResult<Preset> {
    let parsed = parse_requirements(requirements)?;
    Ok(preset
        .iter()
        .filter(|(_, profile)| profile_satisfies(profile, &parsed))
        .map(|(name, profile)| (name.clone(), profile.clone()))
        .collect())
}

/// Fail with the requirement strings when filtering left nothing.
pub fn ensure_profiles<S: AsRef<str>>(filtered: Preset, requirements: &[S]) -> AlignResult<Preset> {
    if filtered.is_empty() {
        return Err(AlignError::UnsatisfiedRequirements(
            requirements.iter().map(|r| r.as_ref().to_string()).collect(),
        ));
    }
    Ok(filtered)
}
