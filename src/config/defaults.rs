//! Built-in geometry: an A4 portrait certificate with a letterhead, an
//! officials sidebar on the left, and the body in a bordered box.

use super::*;

fn hex(value: &str) -> Color {
    Color::from_hex(value).unwrap_or(Color::BLACK)
}

const NAVY: &str = "#1e3a8a";
const INK: &str = "#111827";

impl Default for CertificateLayoutConfig {
    fn default() -> Self {
        Self {
            version: LAYOUT_VERSION,
            page: PageSpec::default(),
            margin: Margins::default(),
            border: BorderSpec::default(),
            header: HeaderSpec::default(),
            seal: SealSpec::default(),
            sidebar: SidebarSpec::default(),
            content: ContentBoxSpec::default(),
            title: TitleSpec::default(),
            body: BodySpec::default(),
            signature: SignatureSpec::default(),
            footer: FooterSpec::default(),
        }
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        // A4 portrait
        Self {
            width: 595.28,
            height: 841.89,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 28.0,
            right: 28.0,
            bottom: 28.0,
            left: 28.0,
        }
    }
}

impl Default for BorderSpec {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: hex(NAVY),
        }
    }
}

impl Default for HeaderSpec {
    fn default() -> Self {
        let line = |text: &str, offset: f64, font: FontRole, font_size: f64, color: &str| {
            HeaderLine {
                text: text.to_string(),
                offset,
                font,
                font_size,
                color: hex(color),
            }
        };
        Self {
            lines: vec![
                line("Republic of the Philippines", 30.0, FontRole::Times, 11.0, INK),
                line("Province of Laguna", 44.0, FontRole::Times, 11.0, INK),
                line("Municipality of Santa Cruz", 58.0, FontRole::Times, 11.0, INK),
                line("BARANGAY SAN ISIDRO", 78.0, FontRole::TimesBold, 16.0, NAVY),
            ],
            ribbon: RibbonSpec::default(),
            divider: DividerSpec::default(),
        }
    }
}

impl Default for HeaderLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            offset: 0.0,
            font: FontRole::Times,
            font_size: 11.0,
            color: hex(INK),
        }
    }
}

impl Default for RibbonSpec {
    fn default() -> Self {
        Self {
            offset: 92.0,
            height: 20.0,
            inset_x: 2.0,
            fill: hex(NAVY),
            text: "OFFICE OF THE PUNONG BARANGAY".to_string(),
            font: FontRole::HelveticaBold,
            font_size: 10.0,
            text_color: Color::WHITE,
        }
    }
}

impl Default for DividerSpec {
    fn default() -> Self {
        Self {
            offset: 114.0,
            thickness: 3.0,
            inset_x: 2.0,
            color: hex("#d4a017"),
        }
    }
}

impl Default for SealSpec {
    fn default() -> Self {
        Self {
            src: "./assets/barangay-seal.png".to_string(),
            x: 18.0,
            y: 10.0,
            size: 76.0,
            placeholder: PlaceholderSpec::default(),
        }
    }
}

impl Default for PlaceholderSpec {
    fn default() -> Self {
        Self {
            dots: 24,
            dot_radius: 1.8,
            color: hex(NAVY),
        }
    }
}

impl Default for SidebarSpec {
    fn default() -> Self {
        let title = |text: &str, margin_bottom: f64| SidebarTitleLine {
            text: text.to_string(),
            font_size: 12.0,
            margin_bottom,
        };
        let entry = |name: &str, label: &str| SidebarEntry {
            name: name.to_string(),
            label: Some(label.to_string()),
            font_size: 8.5,
            margin_bottom: 20.0,
        };
        Self {
            x: 2.0,
            top: 117.0,
            bottom: 2.0,
            width: 150.0,
            color_top: hex(NAVY),
            color_bottom: hex("#3b82f6"),
            gradient_steps: 40,
            padding_x: 10.0,
            padding_top: 18.0,
            title_lines: vec![title("BARANGAY", 2.0), title("OFFICIALS", 0.0)],
            title_font: FontRole::HelveticaBold,
            title_color: Color::WHITE,
            title_gap: 20.0,
            entries: vec![
                entry("HON. JESUS DE UNA", "Punong Barangay"),
                entry("HON. MARIA SANTOS", "Kagawad, Peace and Order"),
                entry("HON. PEDRO REYES", "Kagawad, Health and Sanitation"),
                entry("HON. ANA GARCIA", "Kagawad, Education"),
                entry("HON. RAMON CRUZ", "Kagawad, Infrastructure"),
                entry("HON. LUZ MENDOZA", "Kagawad, Agriculture"),
                entry("HON. CARLOS BAUTISTA", "Kagawad, Finance"),
                entry("HON. ELENA TORRES", "Kagawad, Women and Family"),
                entry("HON. MARK VILLANUEVA", "SK Chairperson"),
                entry("ROSA AQUINO", "Barangay Secretary"),
                entry("JOSE RAMOS", "Barangay Treasurer"),
            ],
            entry_font: FontRole::HelveticaBold,
            text_color: Color::WHITE,
            label_font: FontRole::HelveticaOblique,
            label_size: 7.0,
            label_gap: 9.0,
            label_color: hex("#dbeafe"),
        }
    }
}

impl Default for SidebarTitleLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 12.0,
            margin_bottom: 0.0,
        }
    }
}

impl Default for SidebarEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: None,
            font_size: 8.5,
            margin_bottom: 20.0,
        }
    }
}

impl Default for ContentBoxSpec {
    fn default() -> Self {
        Self {
            gap_from_sidebar: 12.0,
            top: 129.0,
            bottom: 52.0,
            right_inset: 12.0,
            padding: 22.0,
            border_width: 1.0,
            border_color: hex(NAVY),
        }
    }
}

impl Default for TitleSpec {
    fn default() -> Self {
        Self {
            offset_top: 6.0,
            font: FontRole::TimesBold,
            color: hex(NAVY),
        }
    }
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            offset_from_title: 24.0,
            salutation: Some("TO WHOM IT MAY CONCERN:".to_string()),
            salutation_font: FontRole::TimesBold,
            salutation_gap: 14.0,
            font: FontRole::Times,
            font_size: 12.0,
            line_height: 18.0,
            paragraph_spacing: 10.0,
            color: hex(INK),
        }
    }
}

impl Default for SignatureSpec {
    fn default() -> Self {
        Self {
            offset_from_body: 60.0,
            width: 180.0,
            right_inset: 0.0,
            rule_thickness: 0.8,
            rule_color: hex(INK),
            image_height: 42.0,
            image_gap: 2.0,
            name_font: FontRole::TimesBold,
            name_size: 12.0,
            name_offset: 14.0,
            position_font: FontRole::Times,
            position_size: 11.0,
            position_offset: 28.0,
            color: hex(INK),
        }
    }
}

impl Default for FooterSpec {
    fn default() -> Self {
        Self {
            bottom_offset: 14.0,
            right_inset: 14.0,
            line_gap: 11.0,
            lines: vec![
                FooterLine {
                    text: "Not valid without the official dry seal.".to_string(),
                    font: FontRole::HelveticaOblique,
                    ..FooterLine::default()
                },
                FooterLine {
                    text: "Control No. {id}  |  Issued {issued}".to_string(),
                    ..FooterLine::default()
                },
            ],
        }
    }
}

impl Default for FooterLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: FontRole::Helvetica,
            font_size: 8.0,
            color: hex("#4b5563"),
        }
    }
}
