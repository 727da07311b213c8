// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Country-name and ISO-code to flag-emoji resolution.

/// Flag shown when a country cannot be resolved.
const WORLD_FLAG: &str = "🌍";

/// Country-name (Spanish and English, accent-folded lowercase) to
/// ISO 3166-1 alpha-2 code table.
const COUNTRY_TO_CODE: &[(&str, &str)] = &[
    ("argentina", "AR"),
    ("republica argentina", "AR"),
    ("espana", "ES"),
    ("spain", "ES"),
    ("francia", "FR"),
    ("france", "FR"),
    ("italia", "IT"),
    ("italy", "IT"),
    ("alemania", "DE"),
    ("germany", "DE"),
    ("portugal", "PT"),
    ("reino unido", "GB"),
    ("united kingdom", "GB"),
    ("uk", "GB"),
    ("england", "GB"),
    ("inglaterra", "GB"),
    ("estados unidos", "US"),
    ("united states", "US"),
    ("usa", "US"),
    ("eeuu", "US"),
    ("mexico", "MX"),
    ("brasil", "BR"),
    ("brazil", "BR"),
    ("chile", "CL"),
    ("colombia", "CO"),
    ("peru", "PE"),
    ("venezuela", "VE"),
    ("ecuador", "EC"),
    ("uruguay", "UY"),
    ("paraguay", "PY"),
    ("bolivia", "BO"),
    ("cuba", "CU"),
    ("republica dominicana", "DO"),
    ("puerto rico", "PR"),
    ("costa rica", "CR"),
    ("panama", "PA"),
    ("guatemala", "GT"),
    ("honduras", "HN"),
    ("el salvador", "SV"),
    ("nicaragua", "NI"),
    ("canada", "CA"),
    ("japon", "JP"),
    ("japan", "JP"),
    ("china", "CN"),
    ("corea del sur", "KR"),
    ("india", "IN"),
    ("australia", "AU"),
    ("nueva zelanda", "NZ"),
    ("new zealand", "NZ"),
    ("rusia", "RU"),
    ("russia", "RU"),
    ("paises bajos", "NL"),
    ("netherlands", "NL"),
    ("belgica", "BE"),
    ("belgium", "BE"),
    ("suiza", "CH"),
    ("switzerland", "CH"),
    ("austria", "AT"),
    ("grecia", "GR"),
    ("greece", "GR"),
    ("turquia", "TR"),
    ("polonia", "PL"),
    ("suecia", "SE"),
    ("noruega", "NO"),
    ("dinamarca", "DK"),
    ("finlandia", "FI"),
    ("irlanda", "IE"),
    ("ireland", "IE"),
    ("croacia", "HR"),
    ("marruecos", "MA"),
    ("morocco", "MA"),
    ("egipto", "EG"),
    ("egypt", "EG"),
    ("sudafrica", "ZA"),
    ("israel", "IL"),
    ("tailandia", "TH"),
    ("singapur", "SG"),
];

/// Lowercase, trim, and fold the diacritics common in Spanish names so
/// "España" and "Espana" resolve identically.
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Flag emoji for an ISO 3166-1 alpha-2 code via regional indicators.
pub fn code_to_flag(code: &str) -> String {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return WORLD_FLAG.to_string();
    }
    code.chars()
        .map(|c| {
            char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32))
                .unwrap_or('🌍')
        })
        .collect()
}

/// Resolve a flag for a country, preferring the ISO code when present.
///
/// Name resolution tries an exact table match, then a substring match in
/// either direction (handles "Reino Unido de Gran Bretaña" style long forms).
pub fn country_flag(name: Option<&str>, code: Option<&str>) -> String {
    if let Some(code) = code {
        if code.trim().len() == 2 {
            return code_to_flag(code);
        }
    }

    let Some(name) = name else {
        return WORLD_FLAG.to_string();
    };
    if name.trim().is_empty() {
        return WORLD_FLAG.to_string();
    }

    let normalized = normalize(name);
    let code = COUNTRY_TO_CODE
        .iter()
        .find(|(n, _)| *n == normalized)
        .or_else(|| {
            COUNTRY_TO_CODE
                .iter()
                .find(|(n, _)| normalized.contains(n) || n.contains(normalized.as_str()))
        })
        .map(|(_, c)| *c);

    match code {
        Some(c) => code_to_flag(c),
        None => WORLD_FLAG.to_string(),
    }
}
