use serde::{Deserialize, Serialize};

/// Восемь внешних ссылок события (регистрация, результаты и т.д.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    Registration,
    MeetInfo,
    Schedule,
    Entries,
    StartLists,
    LiveResults,
    PdfResults,
    TfrrsResults,
}

impl LinkKind {
    pub const ALL: [LinkKind; 8] = [
        LinkKind::Registration,
        LinkKind::MeetInfo,
        LinkKind::Schedule,
        LinkKind::Entries,
        LinkKind::StartLists,
        LinkKind::LiveResults,
        LinkKind::PdfResults,
        LinkKind::TfrrsResults,
    ];

    pub fn url_field(self) -> &'static str {
        match self {
            LinkKind::Registration => "registrationUrl",
            LinkKind::MeetInfo => "meetInfoUrl",
            LinkKind::Schedule => "scheduleUrl",
            LinkKind::Entries => "entriesUrl",
            LinkKind::StartLists => "startListsUrl",
            LinkKind::LiveResults => "liveResultsUrl",
            LinkKind::PdfResults => "pdfResultsUrl",
            LinkKind::TfrrsResults => "tfrrsResultsUrl",
        }
    }

    pub fn show_field(self) -> &'static str {
        match self {
            LinkKind::Registration => "showRegistration",
            LinkKind::MeetInfo => "showMeetInfo",
            LinkKind::Schedule => "showSchedule",
            LinkKind::Entries => "showEntries",
            LinkKind::StartLists => "showStartLists",
            LinkKind::LiveResults => "showLiveResults",
            LinkKind::PdfResults => "showPdfResults",
            LinkKind::TfrrsResults => "showTfrrsResults",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Registration => "Registration",
            LinkKind::MeetInfo => "Meet Info",
            LinkKind::Schedule => "Schedule",
            LinkKind::Entries => "Entries",
            LinkKind::StartLists => "Start Lists",
            LinkKind::LiveResults => "Live Results",
            LinkKind::PdfResults => "PDF Results",
            LinkKind::TfrrsResults => "TFRRS Results",
        }
    }
}

/// Пары (URL, флаг показа) в том виде, в каком они лежат в записи события.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLinks {
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_registration: bool,
    #[serde(default)]
    pub meet_info_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_meet_info: bool,
    #[serde(default)]
    pub schedule_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_schedule: bool,
    #[serde(default)]
    pub entries_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_entries: bool,
    #[serde(default)]
    pub start_lists_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_start_lists: bool,
    #[serde(default)]
    pub live_results_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_live_results: bool,
    #[serde(default)]
    pub pdf_results_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_pdf_results: bool,
    #[serde(default)]
    pub tfrrs_results_url: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub show_tfrrs_results: bool,
}

impl EventLinks {
    pub fn url(&self, kind: LinkKind) -> Option<&str> {
        let url = match kind {
            LinkKind::Registration => &self.registration_url,
            LinkKind::MeetInfo => &self.meet_info_url,
            LinkKind::Schedule => &self.schedule_url,
            LinkKind::Entries => &self.entries_url,
            LinkKind::StartLists => &self.start_lists_url,
            LinkKind::LiveResults => &self.live_results_url,
            LinkKind::PdfResults => &self.pdf_results_url,
            LinkKind::TfrrsResults => &self.tfrrs_results_url,
        };
        url.as_deref()
    }

    pub fn is_shown(&self, kind: LinkKind) -> bool {
        *self.show_ref(kind)
    }

    pub fn set_shown(&mut self, kind: LinkKind, shown: bool) {
        *self.show_mut(kind) = shown;
    }

    fn show_ref(&self, kind: LinkKind) -> &bool {
        match kind {
            LinkKind::Registration => &self.show_registration,
            LinkKind::MeetInfo => &self.show_meet_info,
            LinkKind::Schedule => &self.show_schedule,
            LinkKind::Entries => &self.show_entries,
            LinkKind::StartLists => &self.show_start_lists,
            LinkKind::LiveResults => &self.show_live_results,
            LinkKind::PdfResults => &self.show_pdf_results,
            LinkKind::TfrrsResults => &self.show_tfrrs_results,
        }
    }

    fn show_mut(&mut self, kind: LinkKind) -> &mut bool {
        match kind {
            LinkKind::Registration => &mut self.show_registration,
            LinkKind::MeetInfo => &mut self.show_meet_info,
            LinkKind::Schedule => &mut self.show_schedule,
            LinkKind::Entries => &mut self.show_entries,
            LinkKind::StartLists => &mut self.show_start_lists,
            LinkKind::LiveResults => &mut self.show_live_results,
            LinkKind::PdfResults => &mut self.show_pdf_results,
            LinkKind::TfrrsResults => &mut self.show_tfrrs_results,
        }
    }

    /// Пустые URL из формы превращаются в `null`.
    pub fn normalized(self) -> Self {
        use super::non_empty;
        EventLinks {
            registration_url: non_empty(self.registration_url),
            meet_info_url: non_empty(self.meet_info_url),
            schedule_url: non_empty(self.schedule_url),
            entries_url: non_empty(self.entries_url),
            start_lists_url: non_empty(self.start_lists_url),
            live_results_url: non_empty(self.live_results_url),
            pdf_results_url: non_empty(self.pdf_results_url),
            tfrrs_results_url: non_empty(self.tfrrs_results_url),
            ..self
        }
    }
}

/// Частичное обновление ссылок: отправляются только заданные поля.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_registration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet_info_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_meet_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_schedule: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_entries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_lists_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_start_lists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_results_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_live_results: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_results_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_pdf_results: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tfrrs_results_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_tfrrs_results: Option<bool>,
}

impl LinksPatch {
    /// Патч, который меняет только один флаг показа.
    pub fn show_only(kind: LinkKind, shown: bool) -> Self {
        let mut patch = LinksPatch::default();
        let slot = match kind {
            LinkKind::Registration => &mut patch.show_registration,
            LinkKind::MeetInfo => &mut patch.show_meet_info,
            LinkKind::Schedule => &mut patch.show_schedule,
            LinkKind::Entries => &mut patch.show_entries,
            LinkKind::StartLists => &mut patch.show_start_lists,
            LinkKind::LiveResults => &mut patch.show_live_results,
            LinkKind::PdfResults => &mut patch.show_pdf_results,
            LinkKind::TfrrsResults => &mut patch.show_tfrrs_results,
        };
        *slot = Some(shown);
        patch
    }

    /// Полная замена всех восьми пар (форма редактирования).
    pub fn replace_all(links: EventLinks) -> Self {
        LinksPatch {
            registration_url: Some(links.registration_url),
            show_registration: Some(links.show_registration),
            meet_info_url: Some(links.meet_info_url),
            show_meet_info: Some(links.show_meet_info),
            schedule_url: Some(links.schedule_url),
            show_schedule: Some(links.show_schedule),
            entries_url: Some(links.entries_url),
            show_entries: Some(links.show_entries),
            start_lists_url: Some(links.start_lists_url),
            show_start_lists: Some(links.show_start_lists),
            live_results_url: Some(links.live_results_url),
            show_live_results: Some(links.show_live_results),
            pdf_results_url: Some(links.pdf_results_url),
            show_pdf_results: Some(links.show_pdf_results),
            tfrrs_results_url: Some(links.tfrrs_results_url),
            show_tfrrs_results: Some(links.show_tfrrs_results),
        }
    }

    pub fn apply(self, links: &mut EventLinks) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }
        set(&mut links.registration_url, self.registration_url);
        set(&mut links.show_registration, self.show_registration);
        set(&mut links.meet_info_url, self.meet_info_url);
        set(&mut links.show_meet_info, self.show_meet_info);
        set(&mut links.schedule_url, self.schedule_url);
        set(&mut links.show_schedule, self.show_schedule);
        set(&mut links.entries_url, self.entries_url);
        set(&mut links.show_entries, self.show_entries);
        set(&mut links.start_lists_url, self.start_lists_url);
        set(&mut links.show_start_lists, self.show_start_lists);
        set(&mut links.live_results_url, self.live_results_url);
        set(&mut links.show_live_results, self.show_live_results);
        set(&mut links.pdf_results_url, self.pdf_results_url);
        set(&mut links.show_pdf_results, self.show_pdf_results);
        set(&mut links.tfrrs_results_url, self.tfrrs_results_url);
        set(&mut links.show_tfrrs_results, self.show_tfrrs_results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_only_patch_serializes_a_single_field() {
        let patch = LinksPatch::show_only(LinkKind::LiveResults, true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "showLiveResults": true }));
    }

    #[test]
    fn null_flags_deserialize_as_hidden() {
        let links: EventLinks = serde_json::from_value(serde_json::json!({
            "registrationUrl": "https://reg.example",
            "showRegistration": null
        }))
        .unwrap();
        assert_eq!(links.url(LinkKind::Registration), Some("https://reg.example"));
        assert!(!links.is_shown(LinkKind::Registration));
    }

    #[test]
    fn link_kind_uses_camel_case_path_names() {
        let kind: LinkKind = serde_json::from_value(serde_json::json!("tfrrsResults")).unwrap();
        assert_eq!(kind, LinkKind::TfrrsResults);
        assert_eq!(kind.show_field(), "showTfrrsResults");
    }

    #[test]
    fn cleared_url_serializes_as_null() {
        let patch = LinksPatch {
            schedule_url: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "scheduleUrl": null }));
    }
}
