//! Report assembly.
//!
//! Deterministic rendering of a completed [`RunState`] into one
//! human-readable markdown report and one machine-readable JSON bundle.
//! Pure formatting: no network or oracle calls, and defensive against
//! every legal report shape (executed, skipped, or placeholder).

use serde_json::json;

use crate::agents::{
    FigureAnalysis, FunderRecommendation, JournalRecommendation, SectionWriting, WritingMetrics,
};
use crate::pipeline::RunState;

const SKIPPED_NOTE: &str = "_This agent was not selected for this analysis._";

/// Render the complete markdown report.
///
/// Section order is fixed: overview, methodology, results, visualization,
/// writing, citations, plagiarism, journals, funding, final summary.
pub fn render_report(state: &RunState) -> String {
    let sections = &state.sections;
    let reports = &state.reports;
    let mut out = String::with_capacity(16 * 1024);

    // --- Overview ---
    out.push_str(&format!(
        "# RESEARCH PAPER ANALYSIS REPORT\n\
         Generated: {}\n\n---\n\n\
         ## PAPER OVERVIEW\n\n\
         **Title:** {}\n\
         **Paper Type:** {}\n\n\
         **Abstract:**\n{}\n\n---\n\n",
        state.started_at.format("%Y-%m-%d %H:%M:%S"),
        or_na(&sections.title),
        state.paper_type.label(),
        snippet(&sections.abstract_text, 800, "Not found"),
    ));

    // --- Methodology ---
    let m = &reports.methodology;
    out.push_str("## METHODOLOGY ASSESSMENT\n\n");
    if m.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Overall Quality Score:** {}/5\n\n\
         ### Sample Size\n\
         - **N:** {}\n\
         - **Adequate:** {}\n\
         - **Power Calculation:** {}\n\
         - **Comment:** {}\n\n\
         ### Study Design\n\
         - **Type:** {}\n\
         - **Quality Score:** {}/5\n\
         - **Appropriateness:** {}\n\n\
         ### Statistical Methods\n\
         - **Methods Used:** {}\n\
         - **Appropriate:** {}\n\
         - **Issues:** {}\n\n\
         ### Identified Biases\n{}\n\n\
         **How Addressed:** {}\n\n\
         ### Reproducibility\n\
         **Score:** {}/5\n{}\n\n\
         ### Critical Issues\n{}\n\n\
         ### Strengths\n{}\n\n---\n\n",
        m.overall_quality,
        m.sample_size.n,
        yes_no(m.sample_size.adequate),
        or_na(&m.sample_size.power_calculation),
        or_na(&m.sample_size.comment),
        or_na(&m.study_design.design_type),
        m.study_design.quality_score,
        or_na(&m.study_design.appropriateness),
        joined(&m.statistical_methods.methods_used, "None identified"),
        yes_no(m.statistical_methods.appropriate),
        joined(&m.statistical_methods.issues, "None identified"),
        bullets(&m.biases.identified, "None identified"),
        or_na(&m.biases.comment),
        m.reproducibility.score,
        or_na(&m.reproducibility.comment),
        flagged(&m.critical_issues, "None identified"),
        bullets(&m.strengths, "None identified"),
    ));

    // --- Results ---
    let r = &reports.results;
    out.push_str("## KEY FINDINGS\n\n");
    if r.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Primary Outcome:** {}\n\n\
         **Result:** {}\n\
         - **Statistically Significant:** {}\n\
         - **P-value:** {}\n\n\
         ### Main Findings\n{}\n\n\
         ### Effect Sizes\n{}\n\n\
         ### Secondary Outcomes\n{}\n\n\
         **Main Conclusion:** {}\n\n\
         **Strength of Evidence:** {}\n\n---\n\n",
        or_na(&r.primary_outcome.measure),
        or_na(&r.primary_outcome.result),
        yes_no(r.primary_outcome.statistically_significant),
        or_na(&r.primary_outcome.p_value),
        fmt_findings(r),
        fmt_effect_sizes(r),
        fmt_secondary_outcomes(r),
        or_na(&r.main_conclusion),
        r.strength_of_evidence.as_str().to_uppercase(),
    ));

    // --- Visualization ---
    let v = &reports.visualization;
    out.push_str("## DATA VISUALIZATION ASSESSMENT\n\n");
    if v.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Figures Analyzed:** {}\n\
         **Overall Quality:** {}/5\n\n\
         ### Overall Assessment\n{}\n\n\
         ### Per-Figure Analysis\n{}\n\n\
         ### Common Patterns\n{}\n\n\
         ### Best Practice Violations\n{}\n\n\
         ### Visualization Strengths\n{}\n\n\
         ### Recommendations\n{}\n\n---\n\n",
        v.figures_analyzed,
        v.overall_quality,
        or_na(&v.overall_assessment),
        fmt_figures(&v.figures),
        bullets(&v.common_patterns, "None identified"),
        flagged(&v.best_practice_violations, "None identified"),
        bullets(&v.strengths, "None identified"),
        bullets(&v.recommendations, "None"),
    ));

    // --- Writing ---
    let w = &reports.writing;
    out.push_str("## WRITING QUALITY\n\n");
    if w.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Overall Writing Score:** {}/5\n\
         **Readability Level:** {}\n\n\
         ### Overall Assessment\n{}\n\n\
         ### Quantitative Metrics\n{}\n\n\
         ### Section-by-Section Analysis\n{}\n\n\
         ### Cross-Section Patterns\n{}\n\n\
         ### Top Improvements\n{}\n\n\
         ### Style Guide References\n{}\n\n---\n\n",
        w.overall_writing_score,
        or_na(&w.readability_level),
        or_na(&w.overall_assessment),
        fmt_metrics(&w.quantitative_metrics),
        fmt_section_writing(&w.sections),
        bullets(&w.cross_section_patterns, "None identified"),
        fmt_improvements(w),
        bullets(&w.style_guide_references, "None"),
    ));

    // --- Citations ---
    let c = &reports.citations;
    out.push_str("## RELATED RESEARCH\n\n");
    if c.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    let supporting: Vec<String> = c
        .supporting_papers
        .iter()
        .map(|p| {
            format!(
                "- **{}** ({}): {}",
                or_na(&p.title),
                year_text(p.year),
                or_na(&p.relevance)
            )
        })
        .collect();
    let conflicting: Vec<String> = c
        .conflicting_papers
        .iter()
        .map(|p| {
            format!(
                "- **{}** ({}): {}",
                or_na(&p.title),
                year_text(p.year),
                or_na(&p.conflict)
            )
        })
        .collect();
    out.push_str(&format!(
        "**Literature Quality:** {}\n\n\
         ### Supporting Evidence\n{}\n\n\
         ### Conflicting Evidence\n{}\n\n\
         ### Research Gaps\n{}\n\n\
         ### Citation Context\n{}\n\n---\n\n",
        c.literature_quality.as_str().to_uppercase(),
        lines_or(&supporting, "No supporting papers identified"),
        lines_or(&conflicting, "No conflicts identified"),
        bullets(&c.research_gaps, "None identified"),
        or_na(&c.citation_context),
    ));

    // --- Plagiarism ---
    let p = &reports.plagiarism;
    out.push_str("## PLAGIARISM & INTEGRITY CHECK\n\n");
    if p.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    let missing: Vec<String> = p
        .missing_citations
        .iter()
        .enumerate()
        .map(|(i, mc)| {
            format!(
                "**{}.** \"{}\"\n- **Reason:** {}\n- **Severity:** {}",
                i + 1,
                snippet(&mc.text, 200, "N/A"),
                or_na(&mc.reason),
                mc.severity.as_str().to_uppercase()
            )
        })
        .collect();
    let suspicious: Vec<String> = p
        .suspicious_sections
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "**{}.** {}\n- **Text:** \"{}\"\n- **Recommendation:** {}",
                i + 1,
                or_na(&s.issue),
                snippet(&s.text, 100, "N/A"),
                or_na(&s.recommendation)
            )
        })
        .collect();
    out.push_str(&format!(
        "**Risk Score:** {}/100\n\
         **Risk Level:** {}\n\n\
         ### Missing Citations ({})\n{}\n\n\
         ### Suspicious Sections ({})\n{}\n\n\
         ### Overall Assessment\n{}\n\n\
         ### Recommendations\n{}\n\n---\n\n",
        p.plagiarism_risk_score,
        p.risk_level.as_str().to_uppercase(),
        p.missing_citations.len(),
        lines_or(&missing, "None identified"),
        p.suspicious_sections.len(),
        lines_or(&suspicious, "None identified"),
        or_na(&p.overall_assessment),
        bullets(&p.recommendations, "None"),
    ));

    // --- Journals ---
    let j = &reports.journals;
    out.push_str("## JOURNAL RECOMMENDATIONS\n\n");
    if j.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Search Queries Used:** {}\n\
         **Journals Analyzed:** {}\n\
         **Recommendation Confidence:** {}\n\n\
         ### Primary Recommendations (Best Fit)\n{}\n\n\
         ### Secondary Recommendations (Backup Options)\n{}\n\n\
         ### Publication Strategy\n{}\n\n\
         ### Key Strengths for Submission\n{}\n\n\
         ### Potential Concerns for Reviewers\n{}\n\n---\n\n",
        joined(&j.search_queries_used, "N/A"),
        j.journals_found,
        j.recommendation_confidence.as_str().to_uppercase(),
        fmt_journals(&j.primary_recommendations),
        fmt_journals(&j.secondary_recommendations),
        if j.publication_strategy.is_empty() {
            "No strategy available"
        } else {
            j.publication_strategy.as_str()
        },
        bullets(&j.key_strengths_for_submission, "None identified"),
        bullets(&j.potential_concerns_for_reviewers, "None identified"),
    ));

    // --- Funding ---
    let f = &reports.funding;
    out.push_str("## FUNDING RECOMMENDATIONS\n\n");
    if f.skipped {
        out.push_str(SKIPPED_NOTE);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "**Search Queries Used:** {}\n\
         **Funders Analyzed:** {}\n\
         **Funded Papers Found:** {}\n\
         **Data Confidence:** {}\n\n\
         ### Funding Landscape\n{}\n\n\
         ### Primary Funding Sources (Best Fit)\n{}\n\n\
         ### Secondary Funding Sources (Additional Options)\n{}\n\n\
         ### Funding Strategy\n{}\n\n---\n\n",
        joined(&f.search_queries_used, "N/A"),
        f.funders_found,
        f.total_similar_funded_papers,
        f.data_confidence.as_str().to_uppercase(),
        if f.funding_landscape.is_empty() {
            "No data available"
        } else {
            f.funding_landscape.as_str()
        },
        fmt_funders(&f.primary_funders),
        fmt_funders(&f.secondary_funders),
        if f.funding_strategy.is_empty() {
            "No strategy available"
        } else {
            f.funding_strategy.as_str()
        },
    ));

    // --- Final summary: one headline field per section ---
    out.push_str(&format!(
        "## FINAL SUMMARY\n\n\
         **Methodology Quality:** {}/5\n\
         **Evidence Strength:** {}\n\
         **DataViz Quality:** {}/5\n\
         **Writing Quality:** {}/5\n\
         **Plagiarism Risk:** {}\n\
         **Top Journal Match:** {}\n\
         **Top Funder Match:** {}\n\
         **Recommendation Confidence:** {}\n\n---\n\n\
         *Report generated by paper-analyzer - 8 analysis agents*\n",
        m.overall_quality,
        r.strength_of_evidence.as_str().to_uppercase(),
        v.overall_quality,
        w.overall_writing_score,
        p.risk_level.as_str().to_uppercase(),
        j.primary_recommendations
            .first()
            .map_or("N/A", |rec| rec.journal_name.as_str()),
        f.primary_funders
            .first()
            .map_or("N/A", |rec| rec.funder_name.as_str()),
        j.recommendation_confidence.as_str().to_uppercase(),
    ));

    out
}

/// Render the machine-readable bundle: a flat map from agent name to its
/// report plus document metadata. Lossless over every report field.
pub fn render_json_bundle(state: &RunState) -> serde_json::Value {
    json!({
        "run_id": state.run_id,
        "started_at": state.started_at,
        "document": state.document,
        "title": state.sections.title,
        "paper_type": state.paper_type,
        "selected_agents": state.selection,
        "sections": state.sections,
        "results": state.reports.results,
        "writing": state.reports.writing,
        "methodology": state.reports.methodology,
        "visualization": state.reports.visualization,
        "citations": state.reports.citations,
        "plagiarism": state.reports.plagiarism,
        "journals": state.reports.journals,
        "funding": state.reports.funding,
    })
}

// --- formatting helpers ---

fn or_na(text: &str) -> &str {
    if text.trim().is_empty() {
        "N/A"
    } else {
        text
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn snippet<'a>(text: &'a str, max: usize, empty: &'a str) -> String {
    if text.trim().is_empty() {
        return empty.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    if truncated.len() < text.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

fn joined(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn bullets(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn flagged(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .map(|i| format!("- WARNING: {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn lines_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join("\n")
    }
}

fn year_text(year: Option<i32>) -> String {
    year.map_or("N/A".to_string(), |y| y.to_string())
}

fn fmt_findings(report: &crate::agents::ResultsReport) -> String {
    if report.key_findings.is_empty() {
        return "No findings extracted".to_string();
    }
    report
        .key_findings
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "**Finding {}:** {}\n- Statistic: {}\n- P-value: {}\n- CI: {}",
                i + 1,
                or_na(&f.finding),
                or_na(&f.statistic),
                or_na(&f.p_value),
                f.confidence_interval.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn fmt_effect_sizes(report: &crate::agents::ResultsReport) -> String {
    if report.effect_sizes.is_empty() {
        return "None reported".to_string();
    }
    report
        .effect_sizes
        .iter()
        .map(|e| {
            format!(
                "- **{}:** {} ({}) - {}",
                or_na(&e.metric),
                e.value.map_or("N/A".to_string(), |v| v.to_string()),
                or_na(&e.interpretation),
                or_na(&e.clinical_significance),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fmt_secondary_outcomes(report: &crate::agents::ResultsReport) -> String {
    if report.secondary_outcomes.is_empty() {
        return "None reported".to_string();
    }
    report
        .secondary_outcomes
        .iter()
        .map(|o| format!("- **{}:** {}", or_na(&o.outcome), or_na(&o.result)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fmt_figures(figures: &[FigureAnalysis]) -> String {
    if figures.is_empty() {
        return "No figures analyzed".to_string();
    }
    figures
        .iter()
        .map(|fig| {
            format!(
                "**Figure {}** (Page {}) - {} - Score: {}/5 - Priority: {}\n\
                 - **Chart Type Appropriate:** {}\n\
                 - **Color:** {}/5 | **Axes:** {}/5 | **Data-Ink:** {}/5 | **Legend:** {}/5\n\
                 - **Strengths:** {}\n\
                 - **Improvements:** {}",
                fig.figure_number,
                fig.page,
                or_na(&fig.chart_type_detected),
                fig.overall_figure_score,
                fig.priority.to_uppercase(),
                fig.chart_type_appropriate
                    .map_or("N/A", |a| if a { "Yes" } else { "No" }),
                fig.color_assessment.score,
                fig.axis_assessment.score,
                fig.data_ink_ratio.score,
                fig.legend_assessment.score,
                joined(&fig.strengths, "None identified"),
                joined(&fig.improvements, "None needed"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn fmt_metrics(metrics: &WritingMetrics) -> String {
    format!(
        "- **Avg Sentence Length:** {} words\n\
         - **Max Sentence Length:** {} words\n\
         - **Passive Voice Ratio:** {:.0}%\n\
         - **Hedge Words:** {}\n\
         - **Filler Words:** {}\n\
         - **Transition Words:** {}\n\
         - **Unique Word Ratio:** {:.0}%\n\
         - **Sentences >40 Words:** {}",
        metrics.avg_sentence_length,
        metrics.max_sentence_length,
        metrics.passive_voice_ratio * 100.0,
        metrics.hedge_word_count,
        metrics.filler_word_count,
        metrics.transition_word_count,
        metrics.unique_word_ratio * 100.0,
        metrics.sentences_over_40_words,
    )
}

fn fmt_section_writing(
    sections: &std::collections::BTreeMap<String, SectionWriting>,
) -> String {
    if sections.is_empty() {
        return "No sections analyzed".to_string();
    }
    sections
        .iter()
        .map(|(name, analysis)| {
            format!(
                "**{}** - Score: {}/5\n\
                 - Clarity: {}/5 | Conciseness: {}/5 | Tone: {}/5\n\
                 - Structure: {}/5 | Precision: {}/5 | Section-Specific: {}/5\n\
                 - Strengths: {}\n\
                 - Weaknesses: {}",
                name,
                analysis.overall_section_score,
                analysis.clarity,
                analysis.conciseness,
                analysis.academic_tone,
                analysis.structure,
                analysis.precision,
                analysis.section_specific,
                joined(&analysis.strengths, "None"),
                joined(&analysis.weaknesses, "None"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn fmt_improvements(report: &crate::agents::WritingReport) -> String {
    if report.top_improvements.is_empty() {
        return "None identified".to_string();
    }
    report
        .top_improvements
        .iter()
        .map(|imp| {
            format!(
                "**{}.** {}: {}",
                imp.priority,
                or_na(&imp.issue),
                imp.detail
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fmt_journals(recommendations: &[JournalRecommendation]) -> String {
    if recommendations.is_empty() {
        return "No recommendations available".to_string();
    }
    recommendations
        .iter()
        .enumerate()
        .map(|(i, j)| {
            let access = if j.is_open_access {
                "Open Access"
            } else {
                "Subscription"
            };
            format!(
                "**{}. {}**\n\
                 - **Publisher:** {}\n\
                 - **2yr Mean Citedness:** {} | **H-Index:** {}\n\
                 - **Access:** {} | **APC:** {}\n\
                 - **Scope Fit:** {} | **Acceptance Likelihood:** {}\n\
                 - **Similar Papers Found:** {}\n\
                 - **Why:** {}\n\
                 - **Homepage:** {}",
                i + 1,
                or_na(&j.journal_name),
                or_na(&j.publisher),
                j.impact_factor_2yr
                    .map_or("N/A".to_string(), |v| format!("{:.2}", v)),
                j.h_index.map_or("N/A".to_string(), |v| v.to_string()),
                access,
                j.apc_usd.map_or("N/A".to_string(), |v| format!("${}", v)),
                or_na(&j.scope_fit).to_uppercase(),
                or_na(&j.acceptance_likelihood).to_uppercase(),
                j.similar_papers_found,
                or_na(&j.fit_reasoning),
                j.homepage_url.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn fmt_funders(funders: &[FunderRecommendation]) -> String {
    if funders.is_empty() {
        return "No recommendations available".to_string();
    }
    funders
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "**{}. {}** ({})\n\
                 - **Relevance:** {}\n\
                 - **Why:** {}\n\
                 - **Programs:** {}\n\
                 - **Typical Amount:** {} | **Duration:** {}\n\
                 - **Eligibility:** {}\n\
                 - **Tip:** {}\n\
                 - **Homepage:** {}",
                i + 1,
                or_na(&f.funder_name),
                if f.country.is_empty() { "?" } else { f.country.as_str() },
                or_na(&f.relevance).to_uppercase(),
                or_na(&f.relevance_reasoning),
                joined(&f.known_programs, "N/A"),
                or_na(&f.typical_amount),
                or_na(&f.typical_duration),
                or_na(&f.eligibility_notes),
                or_na(&f.application_tip),
                f.homepage_url.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
