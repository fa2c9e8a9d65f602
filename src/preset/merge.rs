use super::Preset;

/// Overlay presets in order. Profiles with the same name are unioned, and a
/// later preset's entry replaces an earlier one for the same capability.
pub fn merge_presets<'a, I>(presets: I) -> Preset
where
    I: IntoIterator<Item = &'a Preset>,
{
    let mut merged = Preset::new();
    for preset in presets {
        for (profile_name, profile) in preset {
            let target = merged.entry(profile_name.clone()).or_default();
            for (capability, entry) in profile {
                target.insert(capability.clone(), entry.clone());
            }
        }
    }
    merged
}
