/// Shared state threaded through the wizard steps. The surrounding wizard
/// owns the record; the active step gets `&mut` access and writes only the
/// fields it is responsible for, through these methods. Every write bumps
/// `version` so later steps can notice staleness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    series_id: Option<i64>,
    job_id: Option<i64>,
    toolbox: Option<String>,
    ncpus: Option<u32>,
    nrammb: Option<u64>,
    skip_confirm_popup: bool,
    version: u64,
}

impl WizardState {
    pub fn series_id(&self) -> Option<i64> {
        self.series_id
    }

    /// Write-once: the series is created once per wizard session, so a later
    /// write keeps the first id and reports the refusal.
    pub fn set_series_id(&mut self, series_id: i64) -> bool {
        if self.series_id.is_some() {
            return false;
        }
        self.series_id = Some(series_id);
        self.bump();
        true
    }

    pub fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    /// Set lazily on the first successful save, updated in place afterwards.
    pub fn set_job_id(&mut self, job_id: i64) {
        self.job_id = Some(job_id);
        self.bump();
    }

    pub fn toolbox(&self) -> Option<&str> {
        self.toolbox.as_deref()
    }

    pub fn set_toolbox(&mut self, toolbox: String) {
        self.toolbox = Some(toolbox);
        self.bump();
    }

    pub fn ncpus(&self) -> Option<u32> {
        self.ncpus
    }

    pub fn nrammb(&self) -> Option<u64> {
        self.nrammb
    }

    pub fn set_resources(&mut self, ncpus: u32, nrammb: u64) {
        self.ncpus = Some(ncpus);
        self.nrammb = Some(nrammb);
        self.bump();
    }

    pub fn skip_confirm_popup(&self) -> bool {
        self.skip_confirm_popup
    }

    /// Sticky: once the user has accepted the missing-data warning it never
    /// reappears for this session.
    pub fn set_skip_confirm_popup(&mut self) {
        if !self.skip_confirm_popup {
            self.skip_confirm_popup = true;
            self.bump();
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}
