//! On-disk input fixtures
//!
//! A small two-region geography (Dakar, Thiès) and matching health and
//! education exports.

use std::path::{Path, PathBuf};

pub fn write_text(path: &Path, content: &str) -> PathBuf {
    std::fs::write(path, content).unwrap();
    path.to_path_buf()
}

/// Boundary CSVs: 2 regions, 4 departments, 4 communes
///
/// One department and one commune reference unknown parents.
pub fn write_geography(dir: &Path) {
    write_text(
        &dir.join("SEN_adm1.csv"),
        "\u{feff}NAME_1;Pop;ID_region\nDakar;3 732 282;1\nThiès;2 000 000;2\n",
    );
    write_text(
        &dir.join("SEN_adm2.csv"),
        "NAME_1,NAME_2,ID_2\n\
         Dakar,Pikine,1\n\
         Dakar,Rufisque,2\n\
         Thiès,Mbour,3\n\
         Thiès,Tivaouane,4\n\
         Nowhere,Ghost,9\n",
    );
    write_text(
        &dir.join("SEN_adm3.csv"),
        "NAME_2,NAME_3,ID_3\n\
         Pikine,Guinaw Rail,1\n\
         Rufisque,Bargny,2\n\
         Mbour,Saly,3\n\
         Tivaouane,Mboro,4\n\
         Ghost,Void,5\n",
    );
}

/// Health export: 2 indicators, 5 parseable values
///
/// Territories: Thiès (region, carried to the next row), Pikine
/// (department) and SENEGAL (national).
pub fn write_health_json(path: &Path) -> PathBuf {
    let doc = serde_json::json!({
        "Santé": {
            "Feuil1": [
                {"Période": "Découpage administratif", "Unnamed: 1": "Principaux indicateurs", "2019": "2019"},
                {"Période": "Thiès", "Unnamed: 1": "Nombre de lits d'hospitalisation (*)", "2019": "1 250", "2020": 1300},
                {"Période": null, "Unnamed: 1": "Taux de couverture vaccinale", "2019": "85,5", "2020": "-"},
                {"Période": "Pikine", "Unnamed: 1": "Nombre de lits d'hospitalisation", "2019": 400},
                {"Période": "SENEGAL", "Unnamed: 1": "Nombre de lits d'hospitalisation", "2019": 9000}
            ]
        }
    });
    write_text(path, &doc.to_string())
}

/// Education export: 1 indicator, 3 parseable values
pub fn write_education_json(path: &Path) -> PathBuf {
    let doc = serde_json::json!({
        "Education": {
            "TBS": [
                {"A": "Fréquence : annuelle, Indicateur : Taux brut de scolarisation, Unité : %", "B": null, "C": null},
                {"A": "Période", "B": "2019-2020", "C": "2020-2021"},
                {"A": "Sexe", "B": "Garçons", "C": "Filles"},
                {"A": "Thiès", "B": "88,4", "C": 90.1},
                {"A": "Rufisque", "B": "ND", "C": "95"}
            ]
        }
    });
    write_text(path, &doc.to_string())
}
