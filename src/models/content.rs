//! Portfolio content document - the single mutable document the site renders.
//!
//! The document is keyed by section (hero/about/skills/projects/experience/
//! contact). List order is display order and must round-trip unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hero section: headline identity and social links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub github_url: String,
    pub linkedin_url: String,
    pub email_url: String,
    pub image_url: String,
}

/// About highlight card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutHighlight {
    pub title: String,
    pub description: String,
}

/// About section: ordered paragraphs plus optional highlight cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<AboutHighlight>,
}

/// One skill category with an ordered list of skill names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub title: String,
    pub skills: Vec<String>,
}

/// Project card background, tagged by kind.
///
/// Historical payloads carried either a `gradient` string or loose
/// `bgType`/`bgValue` pairs; the tagged union is the canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bgType", content = "bgValue", rename_all = "lowercase")]
pub enum ProjectBackground {
    Gradient(String),
    Image(String),
    Color(String),
}

/// Project section entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub demo_url: String,
    pub code_url: String,
    #[serde(flatten)]
    pub background: ProjectBackground,
}

/// Experience entry. Insertion order is display order; by convention the
/// list reads reverse-chronologically but nothing enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub year: String,
    pub role: String,
    pub company: String,
    pub description: String,
}

/// Contact section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The full portfolio content document. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub hero: HeroContent,
    pub about: AboutContent,
    pub skills: Vec<SkillCategory>,
    pub projects: Vec<Project>,
    pub experience: Vec<ExperienceEntry>,
    pub contact: ContactInfo,
}

/// Top-level section names of the content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Skills,
    Projects,
    Experience,
    Contact,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Hero,
        Section::About,
        Section::Skills,
        Section::Projects,
        Section::Experience,
        Section::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Experience => "experience",
            Section::Contact => "contact",
        }
    }

    /// Parse an untyped JSON value into the typed value for this section.
    pub fn parse_value(&self, value: serde_json::Value) -> Result<SectionValue, serde_json::Error> {
        Ok(match self {
            Section::Hero => SectionValue::Hero(serde_json::from_value(value)?),
            Section::About => SectionValue::About(serde_json::from_value(value)?),
            Section::Skills => SectionValue::Skills(serde_json::from_value(value)?),
            Section::Projects => SectionValue::Projects(serde_json::from_value(value)?),
            Section::Experience => SectionValue::Experience(serde_json::from_value(value)?),
            Section::Contact => SectionValue::Contact(serde_json::from_value(value)?),
        })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hero" => Ok(Section::Hero),
            "about" => Ok(Section::About),
            "skills" => Ok(Section::Skills),
            "projects" => Ok(Section::Projects),
            "experience" => Ok(Section::Experience),
            "contact" => Ok(Section::Contact),
            _ => Err(()),
        }
    }
}

/// A typed value for one top-level section. Serializes as the bare section
/// payload, exactly as it appears inside the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Hero(HeroContent),
    About(AboutContent),
    Skills(Vec<SkillCategory>),
    Projects(Vec<Project>),
    Experience(Vec<ExperienceEntry>),
    Contact(ContactInfo),
}

impl SectionValue {
    pub fn section(&self) -> Section {
        match self {
            SectionValue::Hero(_) => Section::Hero,
            SectionValue::About(_) => Section::About,
            SectionValue::Skills(_) => Section::Skills,
            SectionValue::Projects(_) => Section::Projects,
            SectionValue::Experience(_) => Section::Experience,
            SectionValue::Contact(_) => Section::Contact,
        }
    }
}

impl ContentDocument {
    /// Extract one top-level section as a typed value.
    pub fn section(&self, section: Section) -> SectionValue {
        match section {
            Section::Hero => SectionValue::Hero(self.hero.clone()),
            Section::About => SectionValue::About(self.about.clone()),
            Section::Skills => SectionValue::Skills(self.skills.clone()),
            Section::Projects => SectionValue::Projects(self.projects.clone()),
            Section::Experience => SectionValue::Experience(self.experience.clone()),
            Section::Contact => SectionValue::Contact(self.contact.clone()),
        }
    }

    /// Replace one top-level section, leaving siblings untouched.
    pub fn set_section(&mut self, value: SectionValue) {
        match value {
            SectionValue::Hero(v) => self.hero = v,
            SectionValue::About(v) => self.about = v,
            SectionValue::Skills(v) => self.skills = v,
            SectionValue::Projects(v) => self.projects = v,
            SectionValue::Experience(v) => self.experience = v,
            SectionValue::Contact(v) => self.contact = v,
        }
    }

    /// Check that every required field carries a non-blank value.
    /// Returns the first offending field path.
    pub fn validate(&self) -> Result<(), String> {
        fn required(field: &str, value: &str) -> Result<(), String> {
            if value.trim().is_empty() {
                Err(format!("Missing required field: {}", field))
            } else {
                Ok(())
            }
        }

        required("hero.name", &self.hero.name)?;
        required("hero.title", &self.hero.title)?;
        required("hero.subtitle", &self.hero.subtitle)?;
        required("hero.description", &self.hero.description)?;

        for (i, category) in self.skills.iter().enumerate() {
            required(&format!("skills[{}].title", i), &category.title)?;
        }
        for (i, project) in self.projects.iter().enumerate() {
            required(&format!("projects[{}].title", i), &project.title)?;
            required(&format!("projects[{}].description", i), &project.description)?;
        }
        for (i, entry) in self.experience.iter().enumerate() {
            required(&format!("experience[{}].year", i), &entry.year)?;
            required(&format!("experience[{}].role", i), &entry.role)?;
            required(&format!("experience[{}].company", i), &entry.company)?;
            required(&format!("experience[{}].description", i), &entry.description)?;
        }

        required("contact.email", &self.contact.email)?;
        required("contact.phone", &self.contact.phone)?;
        required("contact.location", &self.contact.location)?;

        Ok(())
    }
}

/// The fixed default document seeded on first read. Placeholder content
/// only; the contract is that it exists and is idempotent.
pub fn default_document() -> ContentDocument {
    ContentDocument {
        hero: HeroContent {
            name: "Aashutosh Dahal".to_string(),
            title: "Front-End Developer & MERN Stack Expert".to_string(),
            subtitle: "Welcome to my portfolio".to_string(),
            description: "Crafting exceptional digital experiences with modern web \
                          technologies. Specialized in building scalable, performant \
                          applications that users love. Let's create something \
                          extraordinary together."
                .to_string(),
            github_url: "#".to_string(),
            linkedin_url: "#".to_string(),
            email_url: "#".to_string(),
            image_url: "/bg.jpeg".to_string(),
        },
        about: AboutContent {
            paragraphs: vec![
                "I'm a dedicated developer who blends creativity with technical \
                 precision to craft meaningful digital experiences. Skilled in the \
                 MERN stack and modern front-end technologies, I turn complex ideas \
                 into clean and user-focused solutions."
                    .to_string(),
                "My journey in web development began with a simple curiosity about \
                 how the web works, and it has grown into a passion for building \
                 products that truly make an impact. I'm committed to continuous \
                 learning and staying aligned with evolving technologies to deliver \
                 innovative results."
                    .to_string(),
                "Outside of coding, I enjoy going to gym, experimenting with new \
                 tools, contributing to open-source projects, and sharing insights \
                 with the developer community."
                    .to_string(),
            ],
            highlights: vec![],
        },
        skills: vec![
            SkillCategory {
                title: "Frontend".to_string(),
                skills: vec![
                    "React".to_string(),
                    "TypeScript".to_string(),
                    "Next.js".to_string(),
                    "Tailwind CSS".to_string(),
                    "Redux".to_string(),
                    "Vue.js".to_string(),
                ],
            },
            SkillCategory {
                title: "Backend".to_string(),
                skills: vec![
                    "Node.js".to_string(),
                    "Express".to_string(),
                    "MongoDB".to_string(),
                    "PostgreSQL".to_string(),
                    "REST APIs".to_string(),
                    "GraphQL".to_string(),
                ],
            },
            SkillCategory {
                title: "Tools & Others".to_string(),
                skills: vec![
                    "Git".to_string(),
                    "Docker".to_string(),
                    "AWS".to_string(),
                    "Firebase".to_string(),
                    "Jest".to_string(),
                    "CI/CD".to_string(),
                ],
            },
        ],
        projects: vec![
            Project {
                title: "E-Commerce Platform".to_string(),
                description: "A full-stack e-commerce solution with real-time \
                              inventory, payment integration, and admin dashboard."
                    .to_string(),
                tech: vec![
                    "React".to_string(),
                    "Node.js".to_string(),
                    "MongoDB".to_string(),
                    "Stripe".to_string(),
                ],
                demo_url: "#".to_string(),
                code_url: "#".to_string(),
                background: ProjectBackground::Gradient("from-blue-500 to-purple-600".to_string()),
            },
            Project {
                title: "Task Management App".to_string(),
                description: "Collaborative task management tool with real-time \
                              updates, team workspaces, and analytics."
                    .to_string(),
                tech: vec![
                    "Next.js".to_string(),
                    "TypeScript".to_string(),
                    "PostgreSQL".to_string(),
                    "WebSockets".to_string(),
                ],
                demo_url: "#".to_string(),
                code_url: "#".to_string(),
                background: ProjectBackground::Gradient("from-purple-500 to-pink-600".to_string()),
            },
            Project {
                title: "Social Media Dashboard".to_string(),
                description: "Analytics dashboard aggregating data from multiple \
                              social media platforms with beautiful visualizations."
                    .to_string(),
                tech: vec![
                    "React".to_string(),
                    "D3.js".to_string(),
                    "Express".to_string(),
                    "Redis".to_string(),
                ],
                demo_url: "#".to_string(),
                code_url: "#".to_string(),
                background: ProjectBackground::Gradient("from-cyan-500 to-blue-600".to_string()),
            },
        ],
        experience: vec![
            ExperienceEntry {
                year: "2023 - Present".to_string(),
                role: "Senior Front-End Developer".to_string(),
                company: "Tech Innovations Inc.".to_string(),
                description: "Leading front-end development for enterprise \
                              applications, mentoring junior developers, and \
                              implementing best practices."
                    .to_string(),
            },
            ExperienceEntry {
                year: "2021 - 2023".to_string(),
                role: "Full-Stack Developer".to_string(),
                company: "Digital Solutions Ltd.".to_string(),
                description: "Built and maintained multiple client projects using \
                              MERN stack, improved application performance by 40%."
                    .to_string(),
            },
            ExperienceEntry {
                year: "2019 - 2021".to_string(),
                role: "Junior Developer".to_string(),
                company: "StartUp Ventures".to_string(),
                description: "Developed responsive web applications, collaborated \
                              with designers to implement pixel-perfect UIs."
                    .to_string(),
            },
        ],
        contact: ContactInfo {
            email: "your.email@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            location: "San Francisco, CA".to_string(),
            description: None,
        },
    }
}
