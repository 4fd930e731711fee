use super::Record;
use crate::models::{
    Client, ClientPatch, CreateClientInput, CreateEventInput, CreateFacilityInput, Event,
    EventPatch, Facility, FacilityPatch,
};

const LIST_EVENTS: &str = r#"
query ListEvents($limit: Int, $nextToken: String) {
  listEvents(limit: $limit, nextToken: $nextToken) {
    items {
      id name startDateTime endDateTime timeZone featured eventLogo frontPageOrder
      registrationUrl showRegistration
      meetInfoUrl showMeetInfo
      scheduleUrl showSchedule
      entriesUrl showEntries
      startListsUrl showStartLists
      liveResultsUrl showLiveResults
      pdfResultsUrl showPdfResults
      tfrrsResultsUrl showTfrrsResults
      notes isPublic eventType facilityID clientID _version
      facility { id name timeZone logos city state facilityType }
      client { id companyName logo }
    }
    nextToken
  }
}"#;

const LIST_FACILITIES: &str = r#"
query ListFacilities($limit: Int, $nextToken: String) {
  listFacilities(limit: $limit, nextToken: $nextToken) {
    items {
      id name timeZone address city state zipcode latitude longitude
      facilityType logos description _version
    }
    nextToken
  }
}"#;

const LIST_CLIENTS: &str = r#"
query ListClients($limit: Int, $nextToken: String) {
  listClients(limit: $limit, nextToken: $nextToken) {
    items { id companyName companyWebsite companyDescription logo _version }
    nextToken
  }
}"#;

impl Record for Event {
    type Create = CreateEventInput;
    type Patch = EventPatch;

    const KIND: &'static str = "Event";
    const LIST_FIELD: &'static str = "listEvents";
    const LIST_QUERY: &'static str = LIST_EVENTS;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> Option<i64> {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = Some(version);
    }

    fn from_input(id: String, input: Self::Create) -> Self {
        Event::from_input(id, input)
    }

    fn patch_id(patch: &Self::Patch) -> &str {
        &patch.id
    }

    fn patch_version(patch: &Self::Patch) -> Option<i64> {
        patch.expected_version
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        patch.apply(self)
    }
}

impl Record for Facility {
    type Create = CreateFacilityInput;
    type Patch = FacilityPatch;

    const KIND: &'static str = "Facility";
    const LIST_FIELD: &'static str = "listFacilities";
    const LIST_QUERY: &'static str = LIST_FACILITIES;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> Option<i64> {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = Some(version);
    }

    fn from_input(id: String, input: Self::Create) -> Self {
        Facility::from_input(id, input)
    }

    fn patch_id(patch: &Self::Patch) -> &str {
        &patch.id
    }

    fn patch_version(patch: &Self::Patch) -> Option<i64> {
        patch.expected_version
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        patch.apply(self)
    }
}

impl Record for Client {
    type Create = CreateClientInput;
    type Patch = ClientPatch;

    const KIND: &'static str = "Client";
    const LIST_FIELD: &'static str = "listClients";
    const LIST_QUERY: &'static str = LIST_CLIENTS;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> Option<i64> {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = Some(version);
    }

    fn from_input(id: String, input: Self::Create) -> Self {
        Client::from_input(id, input)
    }

    fn patch_id(patch: &Self::Patch) -> &str {
        &patch.id
    }

    fn patch_version(patch: &Self::Patch) -> Option<i64> {
        patch.expected_version
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        patch.apply(self)
    }
}
