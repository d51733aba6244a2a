use std::collections::HashSet;

use tracing::{debug, warn};

use greenclub_types::models::{
    AboutPageContent, FooterContent, LandingHeroContent, Section, SectionContent, SiteContentEntry,
};

use crate::content::ContentRepository;
use crate::error::{AdminError, Result};
use crate::notify::Notifier;

/// Local drafts of the three editable sections. Edits stay here until the
/// section's own save is issued; saving one section never sends or touches
/// another's draft.
#[derive(Debug, Clone, Default)]
pub struct ContentEditor {
    landing_hero: LandingHeroContent,
    about_page: AboutPageContent,
    footer: FooterContent,
    saving: HashSet<Section>,
}

/// Snapshot of a section's draft taken when its save starts.
#[derive(Debug, Clone)]
pub struct PendingSave {
    content: SectionContent,
}

impl PendingSave {
    pub fn section(&self) -> Section {
        self.content.section()
    }

    pub fn content(&self) -> &SectionContent {
        &self.content
    }

    /// Send the snapshot. Runs without holding the editor so saves of
    /// different sections can overlap.
    pub async fn send(
        &self,
        repo: &ContentRepository,
        notifier: &dyn Notifier,
    ) -> Result<SiteContentEntry> {
        repo.save_section(&self.content, notifier).await
    }
}

impl ContentEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount: fresh drafts seeded from the repository.
    pub async fn load(repo: &ContentRepository) -> Result<Self> {
        let mut editor = Self::new();
        editor.apply_fetched(&repo.fetch_all().await?);
        Ok(editor)
    }

    /// Replace each known section's draft wholesale with its fetched row.
    /// Rows for unknown keys are ignored; rows that fail to decode leave the
    /// draft as it was.
    pub fn apply_fetched(&mut self, entries: &[SiteContentEntry]) {
        for entry in entries {
            match entry.typed_content() {
                Some(Ok(content)) => self.set_draft(content),
                Some(Err(e)) => warn!("Skipping malformed {} content: {}", entry.section_key, e),
                None => debug!("Ignoring unknown section {}", entry.section_key),
            }
        }
    }

    pub fn draft(&self, section: Section) -> SectionContent {
        match section {
            Section::LandingHero => SectionContent::LandingHero(self.landing_hero.clone()),
            Section::AboutPage => SectionContent::AboutPage(self.about_page.clone()),
            Section::Footer => SectionContent::Footer(self.footer.clone()),
        }
    }

    pub fn set_draft(&mut self, content: SectionContent) {
        match content {
            SectionContent::LandingHero(c) => self.landing_hero = c,
            SectionContent::AboutPage(c) => self.about_page = c,
            SectionContent::Footer(c) => self.footer = c,
        }
    }

    pub fn landing_hero(&self) -> &LandingHeroContent {
        &self.landing_hero
    }

    pub fn landing_hero_mut(&mut self) -> &mut LandingHeroContent {
        &mut self.landing_hero
    }

    pub fn about_page(&self) -> &AboutPageContent {
        &self.about_page
    }

    pub fn about_page_mut(&mut self) -> &mut AboutPageContent {
        &mut self.about_page
    }

    pub fn footer(&self) -> &FooterContent {
        &self.footer
    }

    pub fn footer_mut(&mut self) -> &mut FooterContent {
        &mut self.footer
    }

    // -- About page values --

    /// Append an empty value.
    pub fn add_value(&mut self) {
        self.about_page.values.push(String::new());
    }

    /// Replace the value at `index`. Returns false if there is none.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.about_page.values.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove the value at `index`, shifting later ones left. Out of range
    /// is a no-op; returns whether anything was removed.
    pub fn remove_value(&mut self, index: usize) -> bool {
        if index < self.about_page.values.len() {
            self.about_page.values.remove(index);
            true
        } else {
            false
        }
    }

    // -- Saving --

    pub fn is_saving(&self, section: Section) -> bool {
        self.saving.contains(&section)
    }

    pub fn saving(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL.into_iter().filter(|s| self.saving.contains(s))
    }

    /// Mark `section` as saving and snapshot its draft. Fails while a save
    /// of the same section is still in flight.
    pub fn begin_save(&mut self, section: Section) -> Result<PendingSave> {
        if !self.saving.insert(section) {
            return Err(AdminError::SaveInFlight(section));
        }
        Ok(PendingSave { content: self.draft(section) })
    }

    /// Re-enable saving `section`. The draft is kept whatever the outcome.
    pub fn finish_save(&mut self, section: Section) {
        self.saving.remove(&section);
    }

    /// Begin, send and finish in one go. The section is re-enabled even if
    /// this future is dropped before the backend answers.
    pub async fn save(
        &mut self,
        repo: &ContentRepository,
        section: Section,
        notifier: &dyn Notifier,
    ) -> Result<SiteContentEntry> {
        let pending = self.begin_save(section)?;
        let _mark = SavingMark { saving: &mut self.saving, section };
        pending.send(repo, notifier).await
    }
}

/// Clears a section's saving flag when dropped.
struct SavingMark<'a> {
    saving: &'a mut HashSet<Section>,
    section: Section,
}

impl Drop for SavingMark<'_> {
    fn drop(&mut self) {
        self.saving.remove(&self.section);
    }
}
