//! One-shot provisioning utility: creates the printing-domain skills on the
//! vendor's skill-management endpoint and prints the assigned ids.
//!
//! The printed `SKILL_IDS` line is meant to be copied into `.env` (together
//! with `KNOWLEDGE_MODE=skills`) before starting the server. The utility has
//! no runtime interaction with the chat handler.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const SKILLS_BETA: &str = "skills-2025-10-02";

#[derive(Debug, Serialize)]
struct SkillDefinition {
    name: &'static str,
    description: &'static str,
    instructions: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreatedSkill {
    id: String,
}

const SKILLS: &[SkillDefinition] = &[
    SkillDefinition {
        name: "Print Production & Specifications",
        description: "Print production specifications, file requirements, and technical standards",
        instructions: "You are an expert in print production and specifications. Cover: \
            resolution requirements (300 DPI for print, 150 DPI for large format); file \
            formats (PDF/X-1a, PDF/X-4, TIFF, EPS); color management (CMYK vs RGB, Pantone, \
            ICC profiles); bleed and trim (0.125\" standard bleed, crop marks, safety \
            margins); paper specifications (text 60-100lb, cover 65-130lb, gloss/matte/satin \
            finishes); binding (saddle stitch, perfect, spiral, case); and finishing (die \
            cutting, embossing, foil stamping, lamination, UV coating). Give specific \
            measurements, reference industry standards such as GRACoL and SWOP, and \
            recommend file-preparation best practices.",
    },
    SkillDefinition {
        name: "Customer Service & Order Management",
        description: "Quoting, pricing, order tracking, and turnaround time management",
        instructions: "You are an expert in customer service for commercial printing. Help \
            with quoting and the factors behind pricing (quantity, paper, size, colors, \
            finishing), order status through production stages, turnaround times (3-5 \
            business days standard, 24-48 hour rush), quantity breaks, shipping options, \
            the proofing and approval workflow, and rush-order feasibility. Be professional \
            and empathetic, set realistic expectations, offer alternatives, and ask \
            clarifying questions to understand what the customer needs.",
    },
    SkillDefinition {
        name: "Design & Prepress Support",
        description: "Design preparation, prepress workflow, and file optimization",
        instructions: "You are an expert in design preparation and prepress. Support \
            customers with file setup (bleed, margins, color mode, resolution), common \
            design problems (low-resolution images, RGB in CMYK projects, missing fonts, \
            transparency issues), typography (font embedding, outlining, 6pt minimum body \
            text), spot vs process color, overprint and trapping, PDF/X export settings, \
            standard templates (business cards 3.5\"x2\", flyers 8.5\"x11\"), and preflight \
            checks. Identify problems before they cause issues, give step-by-step fixes, \
            and explain the reasons behind requirements.",
    },
    SkillDefinition {
        name: "Product Knowledge",
        description: "Commercial printing products, materials, and applications",
        instructions: "You are an expert in commercial printing products: business cards \
            and stationery, brochures and flyers (tri-fold, z-fold, gatefold), banners and \
            signage (vinyl, mesh, fabric, grommets, indoor vs outdoor), posters (11x17, \
            18x24, 24x36), postcards (EDDM specifications, mailing sizes), catalogs and \
            booklets (binding methods, page-count requirements), packaging, labels and \
            stickers, and large format (trade show displays, vehicle wraps, window \
            graphics). Match products to the customer's use case, explain material \
            properties, and suggest quantities and complementary products.",
    },
    SkillDefinition {
        name: "Technical Troubleshooting",
        description: "File issues, print quality problems, and technical challenges",
        instructions: "You are an expert at troubleshooting commercial printing issues: \
            file upload problems (size limits, format compatibility, corruption), color \
            matching (RGB-to-CMYK conversion, monitor calibration vs print output, Pantone \
            matching), print quality defects (banding, registration, ink coverage, dot \
            gain), PDF flattening and font-embedding errors, pixelation and resolution, \
            cutting and bleed misalignment, finishing defects, and digital vs offset \
            trade-offs. Gather information first, ask targeted diagnostic questions, \
            explain the likely root cause, then give step-by-step solutions and preventive \
            measures.",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let api_key =
        std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY must be set")?;
    let base_url = std::env::var("ANTHROPIC_BASE_URL")
        .unwrap_or_else(|_| "https://api.anthropic.com".to_string());
    let url = format!("{}/v1/skills", base_url.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let mut created: Vec<(&str, String)> = Vec::new();

    println!("Uploading {} skills to {url}\n", SKILLS.len());

    for skill in SKILLS {
        println!("Uploading skill: {}...", skill.name);

        let response = client
            .post(&url)
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .header("anthropic-beta", SKILLS_BETA)
            .json(skill)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("upload of '{}' rejected with status {status}: {body}", skill.name);
        }

        let skill_id: CreatedSkill = response
            .json()
            .await
            .with_context(|| format!("unexpected response for '{}'", skill.name))?;

        println!("  created: {}\n", skill_id.id);
        created.push((skill.name, skill_id.id));
    }

    println!("All skills uploaded. Copy this into .env:\n");
    let ids: Vec<&str> = created.iter().map(|(_, id)| id.as_str()).collect();
    println!("KNOWLEDGE_MODE=skills");
    println!("SKILL_IDS={}", ids.join(","));
    println!();
    for (name, id) in &created {
        println!("#   {id}  {name}");
    }

    Ok(())
}
