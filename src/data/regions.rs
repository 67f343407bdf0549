//! Population → region lookup for the merged HGDP / 1000 Genomes / SGDP /
//! ancient TMRCA matrix.

use crate::config::PanelLayout;
use crate::error::{FigureError, Result};

/// Region assigned to every row past the SGDP block.
pub const ANCIENTS: &str = "Ancients";

/// Which dataset a matrix row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Hgdp,
    Tgp,
    Sgdp,
    Ancient,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Tgp, Panel::Hgdp, Panel::Sgdp, Panel::Ancient];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Hgdp => "HGDP",
            Panel::Tgp => "TGP",
            Panel::Sgdp => "SGDP",
            Panel::Ancient => "Ancient",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Panel::Hgdp => HGDP_REGIONS,
            Panel::Tgp => TGP_REGIONS,
            Panel::Sgdp => SGDP_REGIONS,
            Panel::Ancient => &[],
        }
    }

    /// Region of a population label within this panel.
    pub fn region(self, population: &str) -> Result<&'static str> {
        if self == Panel::Ancient {
            return Ok(ANCIENTS);
        }
        self.table()
            .iter()
            .find(|(pop, _)| *pop == population)
            .map(|(_, region)| *region)
            .ok_or_else(|| FigureError::UnmappedPopulation {
                panel: self.label(),
                label: population.to_string(),
            })
    }

    /// Every population listed for this panel.
    pub fn populations(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(pop, _)| *pop)
    }
}

impl PanelLayout {
    /// Panel of the row at `index`.
    pub fn panel_of(&self, index: usize) -> Panel {
        if index < self.hgdp_end {
            Panel::Hgdp
        } else if index < self.tgp_end {
            Panel::Tgp
        } else if index < self.sgdp_end {
            Panel::Sgdp
        } else {
            Panel::Ancient
        }
    }
}

/// Reduce a matrix column header such as `"Han.1 (SGDP)"` to its population
/// label by cutting at the first `.` and then at the first space.
pub fn population_label(header: &str) -> &str {
    let head = header.split('.').next().unwrap_or(header);
    head.split(' ').next().unwrap_or(head)
}

/// One labelled row of the TMRCA matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub label: String,
    pub panel: Panel,
    pub region: &'static str,
}

impl Population {
    /// Label with its dataset suffix, e.g. `Han_SGDP`; ancient samples keep their label.
    pub fn suffixed(&self) -> String {
        match self.panel {
            Panel::Ancient => self.label.clone(),
            panel => format!("{}_{}", self.label, panel.label()),
        }
    }
}

/// Assign panel and region to every column header by position.
pub fn assign_regions(headers: &[String], layout: &PanelLayout) -> Result<Vec<Population>> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let label = population_label(header);
            let panel = layout.panel_of(i);
            Ok(Population {
                label: label.to_string(),
                panel,
                region: panel.region(label)?,
            })
        })
        .collect()
}

const SGDP_REGIONS: &[(&str, &str)] = &[
    ("Abkhasian", "West Eurasia"),
    ("Adygei", "West Eurasia"),
    ("Albanian", "West Eurasia"),
    ("Aleut", "Central Asia/Siberia"),
    ("Altaian", "Central Asia/Siberia"),
    ("Ami", "East Asia"),
    ("Armenian", "West Eurasia"),
    ("Atayal", "East Asia"),
    ("Australian", "Oceania"),
    ("Balochi", "South Asia"),
    ("BantuHerero", "Africa"),
    ("BantuKenya", "Africa"),
    ("BantuTswana", "Africa"),
    ("Basque", "West Eurasia"),
    ("BedouinB", "West Eurasia"),
    ("Bengali", "South Asia"),
    ("Bergamo", "West Eurasia"),
    ("Biaka", "Africa"),
    ("Bougainville", "Oceania"),
    ("Brahmin", "South Asia"),
    ("Brahui", "South Asia"),
    ("Bulgarian", "West Eurasia"),
    ("Burmese", "East Asia"),
    ("Burusho", "South Asia"),
    ("Cambodian", "East Asia"),
    ("Chane", "Americas"),
    ("Chechen", "West Eurasia"),
    ("Chipewyan", "Americas"),
    ("Chukchi", "Central Asia/Siberia"),
    ("Cree", "Americas"),
    ("Crete", "West Eurasia"),
    ("Czech", "West Eurasia"),
    ("Dai", "East Asia"),
    ("Daur", "East Asia"),
    ("Dinka", "Africa"),
    ("Druze", "West Eurasia"),
    ("Dusun", "Oceania"),
    ("English", "West Eurasia"),
    ("Esan", "Africa"),
    ("Eskimo_Chaplin", "Central Asia/Siberia"),
    ("Eskimo_Naukan", "Central Asia/Siberia"),
    ("Eskimo_Sireniki", "Central Asia/Siberia"),
    ("Estonian", "West Eurasia"),
    ("Even", "Central Asia/Siberia"),
    ("Finnish", "West Eurasia"),
    ("French", "West Eurasia"),
    ("Gambian", "Africa"),
    ("Georgian", "West Eurasia"),
    ("Greek", "West Eurasia"),
    ("Han", "East Asia"),
    ("Hawaiian", "Oceania"),
    ("Hazara", "South Asia"),
    ("Hezhen", "East Asia"),
    ("Hungarian", "West Eurasia"),
    ("Icelandic", "West Eurasia"),
    ("Igbo", "Africa"),
    ("Igorot", "Oceania"),
    ("Iranian", "West Eurasia"),
    ("Iraqi_Jew", "West Eurasia"),
    ("Irula", "South Asia"),
    ("Itelman", "Central Asia/Siberia"),
    ("Japanese", "East Asia"),
    ("Jordanian", "West Eurasia"),
    ("Ju_hoan_North", "Africa"),
    ("Kalash", "South Asia"),
    ("Kapu", "South Asia"),
    ("Karitiana", "Americas"),
    ("Kashmiri_Pandit", "South Asia"),
    ("Kharia", "South Asia"),
    ("Khomani_San", "Africa"),
    ("Khonda_Dora", "South Asia"),
    ("Kinh", "East Asia"),
    ("Kongo", "Africa"),
    ("Korean", "East Asia"),
    ("Kurumba", "South Asia"),
    ("Kusunda", "South Asia"),
    ("Kyrgyz", "Central Asia/Siberia"),
    ("Lahu", "East Asia"),
    ("Lemande", "Africa"),
    ("Lezgin", "West Eurasia"),
    ("Luhya", "Africa"),
    ("Luo", "Africa"),
    ("Madiga", "South Asia"),
    ("Makrani", "South Asia"),
    ("Mala", "South Asia"),
    ("Mandenka", "Africa"),
    ("Mansi", "Central Asia/Siberia"),
    ("Maori", "Oceania"),
    ("Masai", "Africa"),
    ("Mayan", "Americas"),
    ("Mbuti", "Africa"),
    ("Mende", "Africa"),
    ("Miao", "East Asia"),
    ("Mixe", "Americas"),
    ("Mixtec", "Americas"),
    ("Mongola", "Central Asia/Siberia"),
    ("Mozabite", "Africa"),
    ("Nahua", "Americas"),
    ("Naxi", "East Asia"),
    ("North_Ossetian", "West Eurasia"),
    ("Norwegian", "West Eurasia"),
    ("Onge", "South Asia"),
    ("Orcadian", "West Eurasia"),
    ("Oroqen", "East Asia"),
    ("Palestinian", "West Eurasia"),
    ("Papuan", "Oceania"),
    ("Pathan", "South Asia"),
    ("Piapoco", "Americas"),
    ("Pima", "Americas"),
    ("Polish", "West Eurasia"),
    ("Punjabi", "South Asia"),
    ("Quechua", "Americas"),
    ("Relli", "South Asia"),
    ("Russian", "West Eurasia"),
    ("Saami", "West Eurasia"),
    ("Saharawi", "Africa"),
    ("Samaritan", "West Eurasia"),
    ("Sardinian", "West Eurasia"),
    ("She", "East Asia"),
    ("Sherpa", "South Asia"),
    ("Sindhi", "South Asia"),
    ("Somali", "Africa"),
    ("Spanish", "West Eurasia"),
    ("Surui", "Americas"),
    ("Tajik", "West Eurasia"),
    ("Thai", "East Asia"),
    ("Tibetan", "South Asia"),
    ("Tlingit", "Central Asia/Siberia"),
    ("Tubalar", "Central Asia/Siberia"),
    ("Tu", "East Asia"),
    ("Tujia", "East Asia"),
    ("Turkish", "West Eurasia"),
    ("Tuscan", "West Eurasia"),
    ("Ulchi", "Central Asia/Siberia"),
    ("Uygur", "East Asia"),
    ("Xibo", "East Asia"),
    ("Yadava", "South Asia"),
    ("Yakut", "Central Asia/Siberia"),
    ("Yemenite_Jew", "West Eurasia"),
    ("Yi", "East Asia"),
    ("Yoruba", "Africa"),
    ("Zapotec", "Americas"),
];

const HGDP_REGIONS: &[(&str, &str)] = &[
    ("Brahui", "Central/South Asia"),
    ("Balochi", "Central/South Asia"),
    ("Hazara", "Central/South Asia"),
    ("Makrani", "Central/South Asia"),
    ("Sindhi", "Central/South Asia"),
    ("Pathan", "Central/South Asia"),
    ("Kalash", "Central/South Asia"),
    ("Burusho", "Central/South Asia"),
    ("Mbuti", "Africa"),
    ("Biaka", "Africa"),
    ("Bougainville", "Oceania"),
    ("French", "Europe"),
    ("PapuanSepik", "Oceania"),
    ("PapuanHighlands", "Oceania"),
    ("Druze", "Middle East"),
    ("Bedouin", "Middle East"),
    ("Sardinian", "Europe"),
    ("Palestinian", "Middle East"),
    ("Colombian", "Americas"),
    ("Cambodian", "East Asia"),
    ("Japanese", "East Asia"),
    ("Han", "East Asia"),
    ("Orcadian", "Europe"),
    ("Surui", "Americas"),
    ("Maya", "Americas"),
    ("Russian", "Europe"),
    ("Mandenka", "Africa"),
    ("Yoruba", "Africa"),
    ("Yakut", "East Asia"),
    ("San", "Africa"),
    ("BantuSouthAfrica", "Africa"),
    ("Karitiana", "Americas"),
    ("Pima", "Americas"),
    ("Tujia", "East Asia"),
    ("BergamoItalian", "Europe"),
    ("Tuscan", "Europe"),
    ("Yi", "East Asia"),
    ("Miao", "East Asia"),
    ("Oroqen", "East Asia"),
    ("Daur", "East Asia"),
    ("Mongolian", "East Asia"),
    ("Hezhen", "East Asia"),
    ("Xibo", "East Asia"),
    ("Mozabite", "Middle East"),
    ("NorthernHan", "East Asia"),
    ("Uygur", "Central/South Asia"),
    ("Dai", "East Asia"),
    ("Lahu", "East Asia"),
    ("She", "East Asia"),
    ("Naxi", "East Asia"),
    ("Tu", "East Asia"),
    ("Basque", "Europe"),
    ("Adygei", "Europe"),
    ("BantuKenya", "Africa"),
];

const TGP_REGIONS: &[(&str, &str)] = &[
    ("CLM", "Americas"),
    ("MXL", "Americas"),
    ("PUR", "Americas"),
    ("PEL", "Americas"),
    ("LWK", "Africa"),
    ("ASW", "Africa"),
    ("GWD", "Africa"),
    ("MSL", "Africa"),
    ("YRI", "Africa"),
    ("ACB", "Africa"),
    ("ESN", "Africa"),
    ("CHS", "East Asia"),
    ("KHV", "East Asia"),
    ("JPT", "East Asia"),
    ("CHB", "East Asia"),
    ("CDX", "East Asia"),
    ("BEB", "South Asia"),
    ("STU", "South Asia"),
    ("GIH", "South Asia"),
    ("PJL", "South Asia"),
    ("ITU", "South Asia"),
    ("FIN", "Europe"),
    ("GBR", "Europe"),
    ("IBS", "Europe"),
    ("CEU", "Europe"),
    ("TSI", "Europe"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_cut_at_dot_then_space() {
        assert_eq!(population_label("Samaritan (SGDP)"), "Samaritan");
        assert_eq!(population_label("Han.1"), "Han");
        assert_eq!(population_label("YRI"), "YRI");
    }

    #[test]
    fn panels_follow_layout() {
        let layout = PanelLayout::default();
        assert_eq!(layout.panel_of(0), Panel::Hgdp);
        assert_eq!(layout.panel_of(53), Panel::Hgdp);
        assert_eq!(layout.panel_of(54), Panel::Tgp);
        assert_eq!(layout.panel_of(79), Panel::Tgp);
        assert_eq!(layout.panel_of(80), Panel::Sgdp);
        assert_eq!(layout.panel_of(209), Panel::Sgdp);
        assert_eq!(layout.panel_of(210), Panel::Ancient);
    }

    #[test]
    fn same_label_differs_by_panel() {
        assert_eq!(Panel::Hgdp.region("Uygur").unwrap(), "Central/South Asia");
        assert_eq!(Panel::Sgdp.region("Uygur").unwrap(), "East Asia");
        assert_eq!(Panel::Tgp.region("GBR").unwrap(), "Europe");
        assert_eq!(Panel::Ancient.region("Altai").unwrap(), ANCIENTS);
    }

    #[test]
    fn unmapped_label_names_the_panel() {
        let err = Panel::Tgp.region("Han").unwrap_err();
        assert!(matches!(
            err,
            FigureError::UnmappedPopulation { panel: "TGP", ref label } if label == "Han"
        ));
    }

    #[test]
    fn assign_uses_positions() {
        let layout = PanelLayout {
            hgdp_end: 1,
            tgp_end: 2,
            sgdp_end: 3,
        };
        let headers: Vec<String> = ["Han", "CHB", "Samaritan (SGDP)", "Altai"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pops = assign_regions(&headers, &layout).unwrap();
        let suffixed: Vec<String> = pops.iter().map(Population::suffixed).collect();
        assert_eq!(suffixed, ["Han_HGDP", "CHB_TGP", "Samaritan_SGDP", "Altai"]);
        assert_eq!(pops[2].region, "West Eurasia");
    }

    #[test]
    fn panel_tables_have_expected_sizes() {
        assert_eq!(Panel::Sgdp.populations().count(), 142);
        assert_eq!(Panel::Hgdp.populations().count(), 54);
        assert_eq!(Panel::Tgp.populations().count(), 26);
    }
}
