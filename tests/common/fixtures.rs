//! Canned Lux_WS frames

/// Two menu entries, each with one top-level and one nested value
pub const TWO_MENU_NAVIGATION: &str = r#"<Navigation id="0x45c51c">
  <item id="0x1"><name>Temperaturen</name></item>
  <item id="0x2"><name>Eingänge</name></item>
</Navigation>"#;

pub const TEMPERATURES_PAGE: &str = r#"<Content>
  <value>21.5°C</value>
  <item id="0x1a"><name>Vorlauf</name><value>30.2°C</value></item>
</Content>"#;

pub const INPUTS_PAGE: &str = r#"<Content>
  <value>Ein</value>
  <item id="0x2a"><name>Durchfluss</name><value>130 l/h</value></item>
</Content>"#;

/// A single menu entry resembling a real controller page
pub const INFO_NAVIGATION: &str = r#"<Navigation id="0x45c51c">
  <item id="0x45e068">
    <name>Informationen</name>
    <item id="0x45cfa0"><name>Temperaturen</name></item>
    <item id="0x45d3a8"><name>Betriebsstunden</name></item>
  </item>
</Navigation>"#;

pub const INFO_PAGE: &str = r#"<Content>
  <item id="0x4a1">
    <name>Temperaturen</name>
    <item id="0x4a2"><name>Vorlauf</name><value>33.4°C</value></item>
    <item id="0x4a3"><name>Rücklauf Soll</name><value>31.0°C</value></item>
    <item id="0x4a4"><name>Außentemperatur</name><value>---°C</value></item>
    <item id="0x4a5"><name>Mischkreis1</name><value></value></item>
    <item id="0x4a6"><name>Hysterese</name><value>2.0 K</value></item>
  </item>
  <item id="0x4b1">
    <name>Betriebsstunden</name>
    <item id="0x4b2"><name>Verdichter</name><value>12345h</value></item>
    <item id="0x4b3"><name>Heizstab</name><value>17 h</value></item>
    <item id="0x4b4"><name>Laufzeit</name><value>1:02:03</value></item>
  </item>
  <item id="0x4c1">
    <name>Anlagenstatus</name>
    <item id="0x4c2"><name>Betriebszustand</name><value>Heizen</value></item>
    <item id="0x4c3"><name>Leistung Ist</name><value>4.2 kW</value></item>
    <item id="0x4c4"><name>Softwarestand</name><value>V3.88.0</value></item>
  </item>
</Content>"#;

/// Two sibling items share a name
pub const COLLIDING_PAGE: &str = r#"<Content>
  <item><name>Vorlauf</name><value>30.0°C</value></item>
  <item><name>Vorlauf</name><value>31.0°C</value></item>
</Content>"#;

pub const ONLY_EMPTY_VALUES_PAGE: &str = r#"<Content>
  <value></value>
  <item><name>Leer</name><value/></item>
</Content>"#;

/// Whitespace-only text is still text
pub const BLANK_VALUE_PAGE: &str = r#"<Content>
  <item><name>Leer</name><value/></item>
  <item><name>Status</name><value>   </value></item>
</Content>"#;

pub const MISSING_ID_NAVIGATION: &str = r#"<Navigation id="0x45c51c">
  <item><name>Temperaturen</name></item>
</Navigation>"#;

pub const ERROR_REPLY: &str = "<Error>not logged in</Error>";
